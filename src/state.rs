use std::sync::Arc;

use crate::config::{AgentVariant, LlmConfig, ServerConfig};
use crate::llm::{ChatModel, OpenAiChatModel};

/// Process-wide, read-only state shared across requests. Everything
/// per-request (transcript, connection, executor) is built in the handler.
#[derive(Clone)]
pub struct AppState {
    pub server: ServerConfig,
    pub agent_variant: AgentVariant,
    pub model: Arc<dyn ChatModel>,
}

impl AppState {
    pub fn from_env() -> anyhow::Result<Self> {
        let llm = LlmConfig::from_env()?;
        Ok(Self {
            server: ServerConfig::from_env(),
            agent_variant: AgentVariant::from_env(),
            model: Arc::new(OpenAiChatModel::new(llm)),
        })
    }
}
