use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::Tool;
use crate::db::SqlBackend;

const DML_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "TRUNCATE"];

/// Executes a SELECT against the connection and returns the rows as JSON.
/// The connection is opened with read-only intent; this guard additionally
/// rejects DML/DDL before it reaches the server.
pub struct QuerySqlTool {
    db: Arc<dyn SqlBackend>,
}

impl QuerySqlTool {
    pub fn new(db: Arc<dyn SqlBackend>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for QuerySqlTool {
    fn name(&self) -> &str {
        "query-sql"
    }

    fn description(&self) -> &str {
        "Execute a SQL SELECT query against the database and return the result rows as JSON. \
         If the query fails, rewrite it and try again. DML statements are not allowed."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let upper = input.to_uppercase();
        for keyword in DML_KEYWORDS {
            if upper
                .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .any(|word| word == *keyword)
            {
                bail!("query rejected: {} statements are not allowed", keyword);
            }
        }
        self.db.run_query(input).await
    }
}

/// Lists the base tables in the configured schema. Input is ignored.
pub struct ListTablesTool {
    db: Arc<dyn SqlBackend>,
}

impl ListTablesTool {
    pub fn new(db: Arc<dyn SqlBackend>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for ListTablesTool {
    fn name(&self) -> &str {
        "list-tables-sql"
    }

    fn description(&self) -> &str {
        "List the names of all tables in the database. Input is an empty string."
    }

    async fn call(&self, _input: &str) -> Result<String> {
        let tables = self.db.list_tables().await?;
        Ok(tables.join(", "))
    }
}

/// Returns the column names and types for one table.
pub struct InfoSqlTool {
    db: Arc<dyn SqlBackend>,
}

impl InfoSqlTool {
    pub fn new(db: Arc<dyn SqlBackend>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Tool for InfoSqlTool {
    fn name(&self) -> &str {
        "info-sql"
    }

    fn description(&self) -> &str {
        "Get the schema (column names and types) for a table. Input is the table name."
    }

    async fn call(&self, input: &str) -> Result<String> {
        self.db.describe_table(input.trim()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqlBackend;

    struct RecordingBackend;

    #[async_trait]
    impl SqlBackend for RecordingBackend {
        async fn run_query(&self, sql: &str) -> Result<String> {
            Ok(format!("ran: {}", sql))
        }

        async fn list_tables(&self) -> Result<Vec<String>> {
            Ok(vec!["M6_Pedidos".to_string(), "M6_PedidosCuerpo".to_string()])
        }

        async fn describe_table(&self, table: &str) -> Result<String> {
            Ok(format!("schema of {}", table))
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn query_tool_rejects_dml() {
        let tool = QuerySqlTool::new(Arc::new(RecordingBackend));
        let err = tool
            .call("DELETE FROM M6_Pedidos WHERE ID = 1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not allowed"));
    }

    #[tokio::test]
    async fn query_tool_allows_selects_mentioning_similar_words() {
        let tool = QuerySqlTool::new(Arc::new(RecordingBackend));
        // "Updated" is not the UPDATE keyword.
        let out = tool
            .call("SELECT UpdatedAt FROM M6_Pedidos")
            .await
            .unwrap();
        assert!(out.starts_with("ran:"));
    }

    #[tokio::test]
    async fn list_tables_joins_names() {
        let tool = ListTablesTool::new(Arc::new(RecordingBackend));
        assert_eq!(tool.call("").await.unwrap(), "M6_Pedidos, M6_PedidosCuerpo");
    }
}
