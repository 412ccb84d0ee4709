//! Connection and pool configuration.
//!
//! Mirrors the classic pooled-connection settings (host, port, credentials,
//! charset, pool bounds) and validates them before any connection attempt.
//! The struct deserializes from TOML with per-field defaults, so a config
//! file only needs to name the credentials.

use serde::Deserialize;
use sqlrecord_core::{Error, Result};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_autocommit() -> bool {
    true
}

fn default_maxsize() -> u32 {
    10
}

fn default_minsize() -> u32 {
    1
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

/// Pool and connection settings. `user`, `password`, and `db` are required;
/// everything else carries a default.
#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub db: String,
    /// Applied per connection as `client_encoding`.
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Statements always run in implicit autocommit; `false` is rejected at
    /// validation so a caller expecting transaction scoping fails fast.
    #[serde(default = "default_autocommit")]
    pub autocommit: bool,
    #[serde(default = "default_maxsize")]
    pub maxsize: u32,
    #[serde(default = "default_minsize")]
    pub minsize: u32,
    /// Upper bound on waiting for a free pooled connection.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            db: String::new(),
            charset: default_charset(),
            autocommit: default_autocommit(),
            maxsize: default_maxsize(),
            minsize: default_minsize(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl DbConfig {
    /// Config with the required credentials and defaults for the rest.
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        db: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            db: db.into(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("user", &self.user),
            ("password", &self.password),
            ("db", &self.db),
        ] {
            if value.is_empty() {
                return Err(Error::config(format!("missing required credential '{name}'")));
            }
        }
        if self.maxsize == 0 {
            return Err(Error::config("maxsize must be at least 1"));
        }
        if self.minsize > self.maxsize {
            return Err(Error::config(format!(
                "minsize {} exceeds maxsize {}",
                self.minsize, self.maxsize
            )));
        }
        if !self.autocommit {
            return Err(Error::config(
                "autocommit=false is not supported; statements run in implicit autocommit",
            ));
        }
        Ok(())
    }
}
