//! The Postgres-backed executor handle.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgArguments, PgColumn, PgRow};
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};
use tracing::debug;

use sqlrecord_core::{Error, Executor, Result, Row, Value};

use crate::config::DbConfig;
use crate::pool::create_pool;
use crate::sql::to_postgres;

/// Cloneable handle over one shared connection pool.
///
/// Passed by reference into model operations (no process-global state);
/// cloning is cheap and shares the same pool, so multiple isolated pools per
/// process are just multiple `Db` values.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    /// Validate `config` and connect the pool.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        Ok(Self {
            pool: create_pool(config).await?,
        })
    }

    /// Wrap an already-constructed pool (shared setups, tests).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all pooled connections. Call once at process shutdown; pending
    /// acquires fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Executor for Db {
    async fn select(&self, sql: &str, args: &[Value], limit: Option<usize>) -> Result<Vec<Row>> {
        let statement = to_postgres(sql);
        let mut query = sqlx::query(&statement);
        for arg in args {
            query = bind_value(query, arg);
        }

        // One pooled connection owns the whole fetch; the RAII guard returns
        // it on every exit path, including errors.
        let mut conn = self.pool.acquire().await.map_err(Error::storage)?;
        let mut stream = query.fetch(&mut *conn);

        let cap = limit.unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        while rows.len() < cap {
            match stream.try_next().await.map_err(Error::storage)? {
                Some(row) => rows.push(decode_row(&row)?),
                None => break,
            }
        }
        drop(stream);

        debug!(rows = rows.len(), "select returned rows");
        Ok(rows)
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64> {
        let statement = to_postgres(sql);
        let mut query = sqlx::query(&statement);
        for arg in args {
            query = bind_value(query, arg);
        }

        let mut conn = self.pool.acquire().await.map_err(Error::storage)?;
        let done = query.execute(&mut *conn).await.map_err(Error::storage)?;
        Ok(done.rows_affected())
    }
}

fn bind_value<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
    }
}

fn decode_row(row: &PgRow) -> Result<Row> {
    let mut out = Row::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        out.push(column.name().to_string(), decode_value(row, index, column)?);
    }
    Ok(out)
}

fn decode_value(row: &PgRow, index: usize, column: &PgColumn) -> Result<Value> {
    let type_name = column.type_info().name();
    let value = match type_name {
        "BOOL" => row
            .try_get::<Option<bool>, _>(index)
            .map_err(Error::storage)?
            .map(Value::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)
            .map_err(Error::storage)?
            .map(|v| Value::Int(v.into())),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)
            .map_err(Error::storage)?
            .map(|v| Value::Int(v.into())),
        "INT8" => row
            .try_get::<Option<i64>, _>(index)
            .map_err(Error::storage)?
            .map(Value::Int),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)
            .map_err(Error::storage)?
            .map(|v| Value::Float(v.into())),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(index)
            .map_err(Error::storage)?
            .map(Value::Float),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => row
            .try_get::<Option<String>, _>(index)
            .map_err(Error::storage)?
            .map(Value::Text),
        other => {
            return Err(Error::storage(format!(
                "unsupported column type '{other}' for column '{}'",
                column.name()
            )))
        }
    };
    Ok(value.unwrap_or(Value::Null))
}
