//! PostgreSQL backend for sqlrecord.
//!
//! Provides the pooled [`Db`] handle implementing the core
//! [`Executor`](sqlrecord_core::Executor) seam: portable SQL is translated
//! to the Postgres dialect ([`sql::to_postgres`]), values are bound through
//! sqlx's parameterized API, and every call borrows exactly one pooled
//! connection for its duration.

pub mod config;
pub mod db;
pub mod pool;
pub mod sql;

pub use config::DbConfig;
pub use db::Db;
pub use pool::create_pool;
