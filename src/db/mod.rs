pub mod mssql;

use anyhow::Result;
use async_trait::async_trait;

pub use mssql::MssqlBackend;

/// Queryable handle over the per-request database connection. The SQL
/// toolkit talks to the connection only through this seam, which keeps the
/// agent loop testable without a live server.
#[async_trait]
pub trait SqlBackend: Send + Sync {
    /// Run a SELECT and render the rows as a JSON array string.
    async fn run_query(&self, sql: &str) -> Result<String>;

    /// Base table names in the configured schema.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column names and types for one table.
    async fn describe_table(&self, table: &str) -> Result<String>;

    /// Release the underlying connection. Idempotent; operations after
    /// close fail instead of panicking.
    async fn close(&self) -> Result<()>;
}
