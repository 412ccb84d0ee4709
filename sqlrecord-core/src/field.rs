//! Typed column descriptors and reusable default-value factories.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// The five column kinds the engine maps. The SQL type is fixed per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Float,
    Text,
}

impl FieldKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::String => "varchar(100)",
            Self::Boolean => "boolean",
            Self::Integer => "bigint",
            Self::Float => "real",
            Self::Text => "text",
        }
    }

    /// Only short scalar kinds may back a primary key.
    pub(crate) fn key_capable(self) -> bool {
        matches!(self, Self::String | Self::Integer | Self::Float)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// A column default: a fixed value, or a factory invoked lazily the first
/// time a `save` needs it (never at declaration time).
#[derive(Clone)]
pub enum FieldDefault {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl FieldDefault {
    pub fn resolve(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Declarative descriptor for one column of a model type: kind, optional
/// column-name override, primary-key flag, and default.
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    column: Option<String>,
    primary_key: bool,
    default: Option<FieldDefault>,
}

impl Field {
    fn new(kind: FieldKind, default: Option<FieldDefault>) -> Self {
        Self {
            kind,
            column: None,
            primary_key: false,
            default,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String, None)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean, Some(FieldDefault::Value(Value::Bool(false))))
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer, Some(FieldDefault::Value(Value::Int(0))))
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float, Some(FieldDefault::Value(Value::Float(0.0))))
    }

    pub fn text() -> Self {
        Self::new(FieldKind::Text, None)
    }

    /// Override the column name (defaults to the attribute name).
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    /// Mark as the primary key. Key capability is checked at registration;
    /// boolean and text fields are never key-capable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    pub fn default_fn(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(FieldDefault::Factory(Arc::new(factory)));
        self
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    pub(crate) fn column_override(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

/// Ready-made default factories for common key and timestamp columns.
pub mod defaults {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::value::Value;

    /// Random 32-character lowercase hex string, suitable as a string
    /// primary key.
    pub fn uuid_hex() -> Value {
        Value::Text(Uuid::new_v4().simple().to_string())
    }

    /// Current unix time as fractional seconds.
    pub fn unix_time() -> Value {
        Value::Float(Utc::now().timestamp_micros() as f64 / 1_000_000.0)
    }
}
