use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One unit of a message's structured content.
///
/// A `ToolResult` references a prior (or future) `ToolCall` by id but does
/// not own it; pairing the two is the grouping projector's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        content: String,
    },

    ToolCall {
        tool_call_id: String,
        tool_name: String,
        arguments: Value,
    },

    ToolResult {
        tool_call_id: String,
        result: Value,
        is_error: bool,
    },
}

/// One conversation message. Owned exclusively by the reducer while a turn
/// streams; immutable once the session reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,

    /// Flattened accumulator: the ordered concatenation of every delta,
    /// regardless of block shape.
    pub text: String,

    pub blocks: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            blocks: vec![ContentBlock::Text {
                content: text.clone(),
            }],
            text,
        }
    }

    /// Empty assistant message for an incoming turn.
    pub fn assistant() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            text: String::new(),
            blocks: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.blocks.is_empty()
    }
}
