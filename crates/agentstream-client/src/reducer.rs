use agentstream_wire::AgentEvent;

use crate::message::{ContentBlock, Message};

/// Shown in place of an assistant message that failed before any content
/// arrived, so the user never sees an empty turn.
pub const FALLBACK_ERROR_NOTICE: &str =
    "Something went wrong while generating a response. Please try again.";

/// Pure transition: apply one canonical event to the in-flight message and
/// return the next state.
pub fn reduce(mut message: Message, event: &AgentEvent) -> Message {
    match event {
        AgentEvent::ContentDelta { text } => {
            message.text.push_str(text);

            if let Some(ContentBlock::Text { content }) = message.blocks.last_mut() {
                content.push_str(text);
            } else {
                message.blocks.push(ContentBlock::Text {
                    content: text.clone(),
                });
            }
        }

        AgentEvent::ToolCallStarted {
            tool_call_id,
            tool_name,
            arguments,
        } => {
            // A repeated id is a protocol anomaly. The second occurrence is
            // still appended so arrival order stays intact.
            let duplicate = message.blocks.iter().any(|block| {
                matches!(block, ContentBlock::ToolCall { tool_call_id: existing, .. }
                    if existing == tool_call_id)
            });
            if duplicate {
                tracing::warn!("Duplicate tool call id in one message: {}", tool_call_id);
            }

            message.blocks.push(ContentBlock::ToolCall {
                tool_call_id: tool_call_id.clone(),
                tool_name: tool_name.clone(),
                arguments: arguments.clone(),
            });
        }

        AgentEvent::ToolResultReceived {
            tool_call_id,
            result,
            is_error,
        } => {
            // Appended unconditionally in arrival order; a result may land
            // before its call has been seen.
            message.blocks.push(ContentBlock::ToolResult {
                tool_call_id: tool_call_id.clone(),
                result: result.clone(),
                is_error: *is_error,
            });
        }

        // Neither mutates blocks: errors ride the side channel, and the
        // finish marker only means no further deltas are expected.
        AgentEvent::StreamError { .. } | AgentEvent::StreamFinished => {}
    }

    message
}
