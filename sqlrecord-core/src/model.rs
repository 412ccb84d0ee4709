//! Dynamic model records and their persistence operations.
//!
//! A [`Model`] is a mutable attribute bag scoped to one registered
//! [`Schema`]. Nothing is auto-synced: `save`, `update`, and `remove` are
//! explicit round-trips through the [`Executor`], and `find`/`find_all` build
//! fresh instances from fetched rows.

use std::collections::HashMap;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::schema::Schema;
use crate::value::{Row, Value};

/// Row cap or window for [`Model::find_all`]. Numbers are always bound as
/// statement parameters, never interpolated into the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// At most this many rows.
    Count(u64),
    /// Skip `offset` rows in select order, then return at most `count`.
    OffsetCount { offset: u64, count: u64 },
}

impl From<u64> for Limit {
    fn from(count: u64) -> Self {
        Self::Count(count)
    }
}

impl From<(u64, u64)> for Limit {
    fn from((offset, count): (u64, u64)) -> Self {
        Self::OffsetCount { offset, count }
    }
}

/// Options for [`Model::find_all`].
///
/// The `where` and `order by` fragments are trusted raw SQL supplied by the
/// caller; only `args` and the limit numbers are bound as parameters.
#[derive(Debug, Clone, Default)]
pub struct Query {
    where_clause: Option<String>,
    args: Vec<Value>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `where` fragment with its bound arguments.
    pub fn filter(mut self, clause: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        self.where_clause = Some(clause.into());
        self.args = args.into_iter().collect();
        self
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    /// Cap the result: `5u64` for a plain cap, `(10, 5)` for offset 10,
    /// count 5.
    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }
}

/// A mutable record scoped to one schema. Every attribute used in
/// persistence must exist in the schema's field map; `set` enforces this
/// eagerly.
#[derive(Debug, Clone)]
pub struct Model {
    schema: Arc<Schema>,
    values: HashMap<String, Value>,
}

impl Model {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            values: HashMap::new(),
        }
    }

    /// Construct from attribute/value pairs, rejecting unknown attributes.
    pub fn with_values<K, V>(
        schema: Arc<Schema>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut model = Self::new(schema);
        for (attr, value) in values {
            model.set(attr, value)?;
        }
        Ok(model)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn set(&mut self, attr: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let attr = attr.into();
        if !self.schema.has_attr(&attr) {
            return Err(Error::schema(
                self.schema.model(),
                format!("unknown attribute '{attr}'"),
            ));
        }
        self.values.insert(attr, value.into());
        Ok(())
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.values.get(attr)
    }

    /// JSON object of the set attributes, in declaration order.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for attr in self.schema.attrs() {
            if let Some(value) = self.values.get(attr) {
                map.insert(attr.clone(), value.into());
            }
        }
        serde_json::Value::Object(map)
    }

    fn from_row(schema: &Arc<Schema>, row: Row) -> Self {
        let mut values = HashMap::with_capacity(row.len());
        for (column, value) in row {
            match schema.attr_for_column(&column) {
                Some(attr) => {
                    values.insert(attr.to_string(), value);
                }
                None => debug!(column = %column, "ignoring column with no mapped attribute"),
            }
        }
        Self {
            schema: Arc::clone(schema),
            values,
        }
    }

    /// Fetch one record by primary key. `Ok(None)` when no row matches; a
    /// partially-filled instance is never constructed.
    pub async fn find<E>(db: &E, schema: &Arc<Schema>, pk: impl Into<Value>) -> Result<Option<Self>>
    where
        E: Executor + ?Sized,
    {
        let sql = format!("{} where {}", schema.select_sql(), schema.pk_predicate());
        let rows = db.select(&sql, &[pk.into()], Some(1)).await?;
        Ok(rows.into_iter().next().map(|row| Self::from_row(schema, row)))
    }

    /// Fetch every record matching `query`, in select order.
    pub async fn find_all<E>(db: &E, schema: &Arc<Schema>, query: Query) -> Result<Vec<Self>>
    where
        E: Executor + ?Sized,
    {
        let Query {
            where_clause,
            mut args,
            order_by,
            limit,
        } = query;

        let mut sql = schema.select_sql().to_string();
        if let Some(clause) = where_clause {
            sql.push_str(" where ");
            sql.push_str(&clause);
        }
        if let Some(clause) = order_by {
            sql.push_str(" order by ");
            sql.push_str(&clause);
        }
        match limit {
            Some(Limit::Count(count)) => {
                sql.push_str(" limit ?");
                args.push(Value::Int(count as i64));
            }
            Some(Limit::OffsetCount { offset, count }) => {
                sql.push_str(" limit ? offset ?");
                args.push(Value::Int(count as i64));
                args.push(Value::Int(offset as i64));
            }
            None => {}
        }

        let rows = db.select(&sql, &args, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| Self::from_row(schema, row))
            .collect())
    }

    /// Insert this record.
    ///
    /// Every column resolves to "set value, else field default"; factory
    /// defaults are computed now and cached back onto the instance, so a
    /// generated key is readable after saving. An affected count other than
    /// one is logged and reported as success.
    pub async fn save<E>(&mut self, db: &E) -> Result<()>
    where
        E: Executor + ?Sized,
    {
        let schema = Arc::clone(&self.schema);
        let mut args = Vec::with_capacity(schema.other_attrs().len() + 1);
        for attr in schema.other_attrs() {
            args.push(self.value_or_default(attr));
        }
        args.push(self.value_or_default(schema.primary_key()));

        let affected = db.execute(schema.insert_sql(), &args).await?;
        if affected != 1 {
            warn!(
                model = schema.model(),
                table = schema.table(),
                affected,
                "insert affected an unexpected number of rows"
            );
        }
        Ok(())
    }

    /// Write the set values back by primary key. Unset non-key columns are
    /// written as null (no default fallback); an unset primary key is a
    /// schema error.
    pub async fn update<E>(&self, db: &E) -> Result<()>
    where
        E: Executor + ?Sized,
    {
        let mut args = Vec::with_capacity(self.schema.other_attrs().len() + 1);
        for attr in self.schema.other_attrs() {
            args.push(self.values.get(attr).cloned().unwrap_or(Value::Null));
        }
        args.push(self.primary_key_value()?);

        let affected = db.execute(self.schema.update_sql(), &args).await?;
        if affected != 1 {
            warn!(
                model = self.schema.model(),
                table = self.schema.table(),
                affected,
                "update affected an unexpected number of rows"
            );
        }
        Ok(())
    }

    /// Delete this record by primary key.
    pub async fn remove<E>(&self, db: &E) -> Result<()>
    where
        E: Executor + ?Sized,
    {
        let pk = self.primary_key_value()?;
        let affected = db.execute(self.schema.delete_sql(), &[pk]).await?;
        if affected != 1 {
            warn!(
                model = self.schema.model(),
                table = self.schema.table(),
                affected,
                "delete affected an unexpected number of rows"
            );
        }
        Ok(())
    }

    fn primary_key_value(&self) -> Result<Value> {
        self.values
            .get(self.schema.primary_key())
            .cloned()
            .ok_or_else(|| {
                Error::schema(
                    self.schema.model(),
                    format!("primary key '{}' has no value", self.schema.primary_key()),
                )
            })
    }

    fn value_or_default(&mut self, attr: &str) -> Value {
        if let Some(value) = self.values.get(attr) {
            return value.clone();
        }
        let default = self
            .schema
            .field(attr)
            .and_then(|field| field.default())
            .map(|default| default.resolve());
        match default {
            Some(value) => {
                debug!(attr = %attr, value = ?value, "using default value");
                self.values.insert(attr.to_string(), value.clone());
                value
            }
            None => Value::Null,
        }
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for attr in self.schema.attrs() {
            if let Some(value) = self.values.get(attr) {
                map.serialize_entry(attr, value)?;
            }
        }
        map.end()
    }
}
