//! Dialogue wire types.
//!
//! A `DialogueTurn` is the literal unit sent to the chat-completion provider,
//! so the serde representation here *is* the wire format (lowercase roles).

use serde::{Deserialize, Serialize};

/// Fixed system instruction opening every session.
pub const SYSTEM_PROMPT: &str = "You are a helpful chatbot that engages in conversations and eventually recommends a relaxing activity, such as a restaurant, movie theater, or other entertainment options.";

/// Fixed greeting shown as the first assistant turn.
pub const GREETING: &str = "Hello! How can I assist you today?";

/// Prompt appended (without being stored) when the user asks for an
/// on-demand recommendation from the dialogue service.
pub const RECOMMEND_PROMPT: &str = "Based on our conversation, recommend a relaxing activity, such as a restaurant, movie theater, or other entertainment options.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation. Insertion order in the history is
/// semantically meaningful: the history is the prompt context, verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub role: Role,
    pub content: String,
}

impl DialogueTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The fixed two-turn history every session starts from (and resets to).
pub fn initial_history() -> Vec<DialogueTurn> {
    vec![
        DialogueTurn::system(SYSTEM_PROMPT),
        DialogueTurn::assistant(GREETING),
    ]
}
