//! Connection pool construction from validated configuration.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use sqlrecord_core::{Error, Result};

use crate::config::DbConfig;

/// Build a bounded connection pool.
///
/// Configuration problems (missing credentials, inverted bounds,
/// `autocommit=false`) fail before any connection attempt. The charset is
/// applied to every connection via `client_encoding`. Pool exhaustion blocks
/// callers until a connection frees or `acquire_timeout_secs` elapses.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    config.validate()?;

    let connect = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.db)
        .options([("client_encoding", config.charset.as_str())]);

    let pool = PgPoolOptions::new()
        .max_connections(config.maxsize)
        .min_connections(config.minsize)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(connect)
        .await
        .map_err(Error::storage)?;

    info!(
        host = %config.host,
        db = %config.db,
        minsize = config.minsize,
        maxsize = config.maxsize,
        "created database connection pool"
    );
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_configuration_fails_before_connecting() {
        // points at a host that is never contacted: validation trips first
        let mut config = DbConfig::new("", "secret", "appdb");
        config.host = "unreachable.invalid".to_string();

        let err = create_pool(&config).await.unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
