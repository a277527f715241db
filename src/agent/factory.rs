use std::sync::Arc;

use tracing::info;

use super::AgentExecutor;
use crate::config::AgentVariant;
use crate::db::SqlBackend;
use crate::llm::ChatModel;
use crate::prompts;
use crate::toolkit::{self, Calculator, Tool};
use crate::transcript::MemoryMessage;

/// Builds the per-request executor in one of the two supported shapes.
pub struct AgentFactory;

impl AgentFactory {
    pub fn create(
        variant: AgentVariant,
        model: Arc<dyn ChatModel>,
        db: Arc<dyn SqlBackend>,
        memory: Vec<MemoryMessage>,
        record_steps: bool,
    ) -> AgentExecutor {
        info!("Initializing agent variant: {:?}", variant);

        match variant {
            AgentVariant::OpenAiFunctions => {
                // Generic function-calling agent: calculator plus the SQL
                // toolkit, with the prior transcript as memory.
                let mut tools: Vec<Arc<dyn Tool>> = vec![Arc::new(Calculator)];
                tools.extend(toolkit::sql_toolkit(db));

                AgentExecutor::new(
                    model,
                    tools,
                    prompts::SQL_PREFIX.to_string(),
                    None,
                    memory,
                    record_steps,
                )
            }
            AgentVariant::SqlAgent => {
                // Purpose-built SQL agent: SQL toolkit only, no memory,
                // top-K row limit folded into the prompt.
                let system_prompt = format!(
                    "{}\nUnless the question specifies otherwise, limit every query \
                     to at most {} rows.",
                    prompts::SQL_PREFIX,
                    prompts::TOP_K
                );

                AgentExecutor::new(
                    model,
                    toolkit::sql_toolkit(db),
                    system_prompt,
                    Some(prompts::SQL_SUFFIX.to_string()),
                    Vec::new(),
                    record_steps,
                )
            }
        }
    }
}
