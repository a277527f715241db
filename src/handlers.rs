use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::{AgentFactory, AgentOutcome, IntermediateStep};
use crate::config::{AgentVariant, DatasourceConfig};
use crate::db::{MssqlBackend, SqlBackend};
use crate::error::BridgeError;
use crate::llm::ChatModel;
use crate::state::AppState;
use crate::transcript::{self, ChatMessage, Transcript};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub show_intermediate_steps: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub output: String,
    pub intermediate_steps: Vec<IntermediateStep>,
}

/// The bridge: normalize the transcript, open one database connection,
/// hand the question to the agent, release the connection, map the result.
pub async fn sql_agent_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, BridgeError> {
    let request_id = Uuid::new_v4();

    // Normalization happens before any connection exists, so a bad request
    // never allocates one.
    let transcript = transcript::normalize(&body.messages)?;

    // Datasource settings are read per request; credentials can rotate
    // without a restart.
    let datasource = DatasourceConfig::from_env().map_err(BridgeError::Connection)?;
    let db = MssqlBackend::connect(&datasource)
        .await
        .map_err(BridgeError::Connection)?;
    let db: Arc<dyn SqlBackend> = Arc::new(db);

    info!(%request_id, "Executing with input \"{}\"", transcript.question);

    let outcome = drive_agent(
        state.agent_variant,
        state.model.clone(),
        db,
        transcript,
        body.show_intermediate_steps,
    )
    .await?;

    Ok(Json(ChatResponse {
        output: outcome.output,
        intermediate_steps: outcome.intermediate_steps,
    }))
}

/// Runs the agent and releases the connection on both the success and the
/// failure path. Everything that can fail after connect goes through here.
async fn drive_agent(
    variant: AgentVariant,
    model: Arc<dyn ChatModel>,
    db: Arc<dyn SqlBackend>,
    transcript: Transcript,
    record_steps: bool,
) -> Result<AgentOutcome, BridgeError> {
    let executor = AgentFactory::create(variant, model, db.clone(), transcript.memory, record_steps);
    let result = executor.invoke(&transcript.question).await;

    if let Err(e) = db.close().await {
        warn!("Failed to close database connection: {}", e);
    }

    result
}
