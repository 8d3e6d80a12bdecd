use crate::utils::error::EditorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Check that a conversation is ready to submit: non-empty, starts with a
/// user turn, strictly alternates, and ends on a user turn awaiting a reply.
pub fn validate_alternation(turns: &[ChatTurn]) -> Result<(), EditorError> {
    match (turns.first(), turns.last()) {
        (Some(first), Some(last)) if first.role == Role::User && last.role == Role::User => {}
        (None, _) | (_, None) => {
            return Err(EditorError::generation("conversation is empty"));
        }
        _ => {
            return Err(EditorError::generation(
                "conversation must start and end with a user turn",
            ));
        }
    }

    if let Some(i) = turns.windows(2).position(|w| w[0].role == w[1].role) {
        return Err(EditorError::generation(format!(
            "turns {} and {} are both from {}",
            i,
            i + 1,
            turns[i].role.as_str()
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub max_tokens: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(
        &self,
        turns: &[ChatTurn],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, EditorError>;

    fn model(&self) -> &str;
}

/// Binds a credential to a model handle.
///
/// Opening performs no network I/O; a credential the remote service rejects
/// surfaces as `EditorError::AuthConfig` on the first `complete` call.
pub trait ProviderConnector: Send + Sync {
    fn open(&self, credential: &str) -> Result<Box<dyn LLMProvider>, EditorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatTurn::model("ok")).expect("serializable");
        assert_eq!(json, r#"{"role":"model","text":"ok"}"#);
    }

    #[test]
    fn test_alternating_conversation_is_valid() {
        let turns = [ChatTurn::user("a"), ChatTurn::model("b"), ChatTurn::user("c")];
        assert!(validate_alternation(&turns).is_ok());
    }

    #[test]
    fn test_consecutive_roles_rejected() {
        let turns = [ChatTurn::user("a"), ChatTurn::user("b")];
        let err = validate_alternation(&turns).expect_err("two user turns");
        assert!(err.to_string().contains("both from user"));
    }

    #[test]
    fn test_must_start_with_user() {
        let turns = [ChatTurn::model("a"), ChatTurn::user("b")];
        assert!(validate_alternation(&turns).is_err());
    }

    #[test]
    fn test_must_end_awaiting_reply() {
        let turns = [ChatTurn::user("a"), ChatTurn::model("b")];
        assert!(validate_alternation(&turns).is_err());
    }

    #[test]
    fn test_empty_conversation_rejected() {
        assert!(validate_alternation(&[]).is_err());
    }
}
