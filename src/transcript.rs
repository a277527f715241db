use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// One turn of the inbound chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A prior turn handed to the agent as conversational memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryMessage {
    pub role: MemoryRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    User,
    Assistant,
}

impl MemoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryRole::User => "user",
            MemoryRole::Assistant => "assistant",
        }
    }
}

/// Normalized form of the request transcript: everything before the last
/// retained message becomes memory, the last one is the current question.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub memory: Vec<MemoryMessage>,
    pub question: String,
}

/// Filter the transcript to `user`/`assistant` turns and split it into
/// prior memory plus the current question. Messages with any other role
/// are dropped without comment; a transcript with nothing left after
/// filtering is a bad request.
pub fn normalize(messages: &[ChatMessage]) -> Result<Transcript, BridgeError> {
    let mut retained: Vec<MemoryMessage> = messages
        .iter()
        .filter_map(|m| {
            let role = match m.role.as_str() {
                "user" => MemoryRole::User,
                "assistant" => MemoryRole::Assistant,
                _ => return None,
            };
            Some(MemoryMessage {
                role,
                content: m.content.clone(),
            })
        })
        .collect();

    let last = retained.pop().ok_or(BridgeError::EmptyTranscript)?;

    Ok(Transcript {
        memory: retained,
        question: last.content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn memory_is_all_but_last() {
        let transcript = normalize(&[
            msg("user", "hello"),
            msg("assistant", "hi, ask me about orders"),
            msg("user", "how many rows in M6_Pedidos?"),
        ])
        .unwrap();

        assert_eq!(transcript.memory.len(), 2);
        assert_eq!(transcript.memory[0].role, MemoryRole::User);
        assert_eq!(transcript.memory[1].role, MemoryRole::Assistant);
        assert_eq!(transcript.question, "how many rows in M6_Pedidos?");
    }

    #[test]
    fn unknown_roles_are_dropped() {
        let transcript = normalize(&[
            msg("system", "injected"),
            msg("user", "first"),
            msg("tool", "noise"),
            msg("user", "second"),
        ])
        .unwrap();

        assert_eq!(transcript.memory.len(), 1);
        assert_eq!(transcript.memory[0].content, "first");
        assert_eq!(transcript.question, "second");
    }

    #[test]
    fn single_message_has_empty_memory() {
        let transcript =
            normalize(&[msg("user", "List all rows with IDprofiles=9")]).unwrap();

        assert!(transcript.memory.is_empty());
        assert_eq!(transcript.question, "List all rows with IDprofiles=9");
    }

    #[test]
    fn empty_transcript_is_rejected() {
        assert!(matches!(normalize(&[]), Err(BridgeError::EmptyTranscript)));
    }

    #[test]
    fn all_filtered_is_rejected() {
        let result = normalize(&[msg("system", "you are a pirate")]);
        assert!(matches!(result, Err(BridgeError::EmptyTranscript)));
    }
}
