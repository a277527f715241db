pub mod calculator;
pub mod sql_tools;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::db::SqlBackend;
use crate::llm::ToolSpec;

pub use calculator::Calculator;
pub use sql_tools::{InfoSqlTool, ListTablesTool, QuerySqlTool};

/// A callable tool exposed to the agent. Input is a single free-form
/// string; the executor extracts it from the model's function arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the function arguments. All current tools take a
    /// single `input` string.
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": { "type": "string" }
            },
            "required": ["input"]
        })
    }

    async fn call(&self, input: &str) -> Result<String>;
}

pub fn tool_spec(tool: &dyn Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters(),
    }
}

/// The SQL toolkit bound to one open connection: query execution, table
/// listing and schema lookup.
pub fn sql_toolkit(db: Arc<dyn SqlBackend>) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(QuerySqlTool::new(db.clone())),
        Arc::new(ListTablesTool::new(db.clone())),
        Arc::new(InfoSqlTool::new(db)),
    ]
}
