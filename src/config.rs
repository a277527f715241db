use anyhow::{Context, Result};

use crate::prompts;

/// SQL Server connection parameters, read from the environment at request
/// time so credential rotation never requires a restart. Port and schema
/// are fixed by the deployment.
#[derive(Debug, Clone)]
pub struct DatasourceConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub schema: String,
}

impl DatasourceConfig {
    pub const PORT: u16 = 1433;
    pub const SCHEMA: &'static str = "dbo";

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("DB_HOST").context("DB_HOST is not set")?,
            port: Self::PORT,
            username: std::env::var("DB_USERNAME").context("DB_USERNAME is not set")?,
            password: std::env::var("DB_PASS").context("DB_PASS is not set")?,
            database: std::env::var("DB").context("DB is not set")?,
            schema: Self::SCHEMA.to_string(),
        })
    }
}

/// Settings for the outbound chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?,
            model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| prompts::DEFAULT_MODEL.to_string()),
            temperature: prompts::TEMPERATURE,
        })
    }
}

/// Which executor construction the handler uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentVariant {
    /// Generic function-calling agent with conversational memory and the
    /// calculator alongside the SQL toolkit.
    OpenAiFunctions,
    /// Purpose-built SQL agent with a fixed top-K row limit.
    SqlAgent,
}

impl AgentVariant {
    pub fn from_env() -> Self {
        match std::env::var("AGENT_VARIANT").as_deref() {
            Ok("sql-agent") => AgentVariant::SqlAgent,
            _ => AgentVariant::OpenAiFunctions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        Self { port }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasource_port_and_schema_are_fixed() {
        assert_eq!(DatasourceConfig::PORT, 1433);
        assert_eq!(DatasourceConfig::SCHEMA, "dbo");
    }
}
