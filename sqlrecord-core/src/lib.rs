//! Schema-driven record mapping over a pooled asynchronous database.
//!
//! Model types are registered once through [`Schema::builder`], which
//! partitions their field descriptors, derives the table mapping, and
//! precompiles the four canonical CRUD statements. [`Model`] instances are
//! attribute bags scoped to one schema; `find`, `find_all`, `save`, `update`,
//! and `remove` bind runtime values into the precompiled statements.
//!
//! The crate is backend-free: all storage traffic goes through the
//! [`Executor`] trait, so tests substitute an in-memory double and real
//! deployments plug in a driver crate (e.g. `sqlrecord-pg`).

pub mod error;
pub mod executor;
pub mod field;
pub mod model;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use executor::Executor;
pub use field::{defaults, Field, FieldDefault, FieldKind};
pub use model::{Limit, Model, Query};
pub use schema::{Schema, SchemaBuilder};
pub use value::{Row, Value};
