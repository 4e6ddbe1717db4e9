use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::message::ContentBlock;

/// Render-ready view of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallView {
    pub tool_call_id: String,
    pub tool_name: String,
    pub arguments: Value,
}

/// Render-ready view of a tool outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResultView {
    pub tool_call_id: String,
    pub result: Value,
    pub is_error: bool,
}

/// Derived, render-oriented grouping of content blocks. Recomputed from the
/// block list on every update and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupedBlock {
    Text {
        content: String,
    },

    /// A tool call paired with its result, which may not have arrived yet.
    Tool {
        call: ToolCallView,
        result: Option<ToolResultView>,
    },

    /// A result whose call was never observed (e.g. dropped upstream);
    /// passes through standalone rather than being discarded.
    UnpairedResult(ToolResultView),
}

/// Pure, order-preserving projection of a block list into grouped units.
///
/// A result attaches to its call's existing entry in place, so the entry
/// keeps its position relative to any text between the call and the result.
/// Projecting a prefix of the blocks yields a prefix-compatible partial
/// result, which keeps incremental re-projection stable while streaming.
pub fn project(blocks: &[ContentBlock]) -> Vec<GroupedBlock> {
    let mut grouped = Vec::with_capacity(blocks.len());
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for block in blocks {
        match block {
            ContentBlock::Text { content } => grouped.push(GroupedBlock::Text {
                content: content.clone(),
            }),

            ContentBlock::ToolCall {
                tool_call_id,
                tool_name,
                arguments,
            } => {
                slots.insert(tool_call_id, grouped.len());
                grouped.push(GroupedBlock::Tool {
                    call: ToolCallView {
                        tool_call_id: tool_call_id.clone(),
                        tool_name: tool_name.clone(),
                        arguments: arguments.clone(),
                    },
                    result: None,
                });
            }

            ContentBlock::ToolResult {
                tool_call_id,
                result,
                is_error,
            } => {
                let view = ToolResultView {
                    tool_call_id: tool_call_id.clone(),
                    result: result.clone(),
                    is_error: *is_error,
                };

                match slots.get(tool_call_id.as_str()) {
                    Some(&slot) => {
                        if let GroupedBlock::Tool { result: paired, .. } = &mut grouped[slot] {
                            *paired = Some(view);
                        }
                    }
                    None => grouped.push(GroupedBlock::UnpairedResult(view)),
                }
            }
        }
    }

    grouped
}
