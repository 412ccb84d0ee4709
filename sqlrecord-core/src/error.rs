//! Structured error types for the sqlrecord engine.
//!
//! Uses `thiserror` for composable library errors. Binary consumers can
//! still wrap everything in `anyhow`; library consumers get a typed
//! taxonomy. Absence of a row is not an error: `Model::find` returns
//! `Ok(None)` instead.

use thiserror::Error;

/// Boxed driver error carried across the backend seam, so this crate stays
/// free of any concrete driver dependency.
pub type BoxedStorageError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for sqlrecord operations
#[derive(Error, Debug)]
pub enum Error {
    /// Pool or connection configuration rejected before any I/O was attempted
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Model registration or attribute-level schema violation
    #[error("schema error in model '{model}': {reason}")]
    Schema { model: String, reason: String },

    /// Backend failure, propagated unchanged from the driver
    #[error("storage error: {source}")]
    Storage {
        #[from]
        source: BoxedStorageError,
    },
}

/// Result type alias for sqlrecord operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a schema error scoped to one model type
    pub fn schema(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            model: model.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a driver error
    pub fn storage(source: impl Into<BoxedStorageError>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::schema("User", "no primary key field declared");
        assert_eq!(
            err.to_string(),
            "schema error in model 'User': no primary key field declared"
        );

        let err = Error::config("missing required credential 'user'");
        assert!(err.to_string().starts_with("configuration error:"));
    }

    #[test]
    fn test_storage_wraps_source() {
        let err = Error::storage("connection reset".to_string());
        assert!(matches!(err, Error::Storage { .. }));
        assert!(err.to_string().contains("connection reset"));
    }
}
