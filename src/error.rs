use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for one bridge request. Every variant maps to a
/// non-200 status with a `{"error": ...}` body.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("transcript contains no user or assistant messages")]
    EmptyTranscript,

    #[error("failed to connect to database: {0}")]
    Connection(#[source] anyhow::Error),

    #[error("language model request failed: {0}")]
    Llm(#[source] anyhow::Error),

    #[error("agent execution failed: {0}")]
    Agent(#[source] anyhow::Error),
}

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::EmptyTranscript => StatusCode::BAD_REQUEST,
            BridgeError::Connection(_) | BridgeError::Llm(_) => StatusCode::BAD_GATEWAY,
            BridgeError::Agent(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!("request failed: {}", self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transcript_is_bad_request() {
        assert_eq!(BridgeError::EmptyTranscript.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn connection_failure_is_non_200() {
        let err = BridgeError::Connection(anyhow::anyhow!("login failed"));
        assert_ne!(err.status(), StatusCode::OK);
        assert!(!err.to_string().is_empty());
    }
}
