//! The execution seam between model operations and a concrete backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::value::{Row, Value};

/// Runs portable parameterized SQL against one backend.
///
/// The portable dialect uses `?` as the only positional placeholder and
/// backtick-quoted identifiers. Implementations translate both to whatever
/// the driver requires through a real parameterized-query API (never text
/// substitution of argument values), borrow one pooled connection for the
/// duration of each call, and release it on every exit path.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a query and return its rows, at most `limit` of them when given.
    async fn select(&self, sql: &str, args: &[Value], limit: Option<usize>) -> Result<Vec<Row>>;

    /// Run a mutation and return the affected row count.
    ///
    /// Driver failures propagate unchanged to the caller; no retries.
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64>;
}
