use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::message::{ContentBlock, Message, Role};
use crate::transport::AgentClient;

/// Read seam for persisted thread history. The backend owns storage; the
/// core only ever reads.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Fetch the stored messages for a thread as a raw payload. Callers
    /// tolerate non-array responses by treating them as empty.
    async fn load_thread_messages(&self, thread_id: &str) -> Result<Value>;
}

#[async_trait]
impl ThreadStore for AgentClient {
    async fn load_thread_messages(&self, thread_id: &str) -> Result<Value> {
        let response = self
            .http_client()
            .get(format!(
                "{}/api/memory/threads/{}/messages",
                self.base_url(),
                thread_id
            ))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Thread history error ({})", status);
        }

        Ok(response.json().await?)
    }
}

/// Convert a raw history payload into messages. Anything that is not an
/// array comes back empty rather than failing the thread switch.
pub fn messages_from_value(raw: Value) -> Vec<Message> {
    let items = match raw {
        Value::Array(items) => items,
        Value::Null => return Vec::new(),
        other => {
            tracing::warn!(
                "Thread history was not an array (got {}), treating as empty",
                kind_name(&other)
            );
            return Vec::new();
        }
    };

    items.into_iter().filter_map(message_from_item).collect()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn message_from_item(item: Value) -> Option<Message> {
    let role = match item.get("role").and_then(Value::as_str) {
        Some("user") => Role::User,
        Some("assistant") => Role::Assistant,
        _ => return None,
    };

    let id = item
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut text = String::new();
    let mut blocks = Vec::new();

    match item.get("content") {
        Some(Value::String(content)) => {
            text.push_str(content);
            blocks.push(ContentBlock::Text {
                content: content.clone(),
            });
        }
        Some(Value::Array(parts)) => {
            for part in parts {
                if let Some(block) = block_from_part(part) {
                    if let ContentBlock::Text { content } = &block {
                        text.push_str(content);
                    }
                    blocks.push(block);
                }
            }
        }
        // Messages without readable content still occupy their slot in the
        // conversation.
        _ => {}
    }

    Some(Message {
        id,
        role,
        text,
        blocks,
    })
}

/// Stored content parts reuse the wire vocabulary, so field lookups follow
/// the same priority order as the interpreter.
fn block_from_part(part: &Value) -> Option<ContentBlock> {
    match part.get("type").and_then(Value::as_str)? {
        "text" => {
            let content = part.get("text").and_then(Value::as_str)?;
            Some(ContentBlock::Text {
                content: content.to_string(),
            })
        }
        "tool-call" | "tool_call" => {
            let id = first_str(part, &["toolCallId", "id", "tool_call_id"])?;
            let name = first_str(part, &["toolName", "name", "tool_name"])?;
            let arguments = ["args", "arguments", "input"]
                .iter()
                .find_map(|key| part.get(*key))
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default()));

            Some(ContentBlock::ToolCall {
                tool_call_id: id.to_string(),
                tool_name: name.to_string(),
                arguments,
            })
        }
        "tool-result" | "tool_result" => {
            let id = first_str(part, &["toolCallId", "id", "tool_call_id"])?;
            let result = part
                .get("result")
                .or_else(|| part.get("content"))
                .cloned()
                .unwrap_or(Value::Null);
            let is_error = part
                .get("isError")
                .and_then(Value::as_bool)
                .unwrap_or(false);

            Some(ContentBlock::ToolResult {
                tool_call_id: id.to_string(),
                result,
                is_error,
            })
        }
        _ => None,
    }
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| value.get(*key).and_then(Value::as_str))
}
