use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical events emitted by the interpreter, independent of the
/// wire-shape variation between producer versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Incremental assistant text.
    ContentDelta {
        text: String,
    },

    /// The agent started a tool invocation.
    ToolCallStarted {
        tool_call_id: String,
        tool_name: String,
        arguments: Value,
    },

    /// A tool finished and reported its outcome.
    ToolResultReceived {
        tool_call_id: String,
        result: Value,
        is_error: bool,
    },

    /// Producer-signaled error. Does not terminate the stream by itself;
    /// a well-behaved producer follows up with a finish marker or a close.
    StreamError {
        message: String,
    },

    /// Top-level finish marker (step-level finish markers never map here).
    StreamFinished,
}
