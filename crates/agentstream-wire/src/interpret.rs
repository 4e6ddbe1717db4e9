use serde_json::{Map, Value};

use crate::event::AgentEvent;

/// Fallback text when an error envelope carries no readable message.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred while generating the response";

/// One classification rule: a discriminator predicate plus an extractor.
///
/// Rules run in priority order and the first matching discriminator wins,
/// whether or not its extractor produces an event. An extractor that cannot
/// recover the fields it needs returns None and the envelope is dropped.
struct Rule {
    matches: fn(&str) -> bool,
    extract: fn(&Value) -> Option<AgentEvent>,
}

const RULES: &[Rule] = &[
    Rule {
        matches: is_error_kind,
        extract: extract_error,
    },
    Rule {
        matches: is_text_kind,
        extract: extract_text,
    },
    Rule {
        matches: is_tool_call_kind,
        extract: extract_tool_call,
    },
    Rule {
        matches: is_tool_result_kind,
        extract: extract_tool_result,
    },
    Rule {
        matches: is_finish_kind,
        extract: extract_finish,
    },
];

/// Classify one decoded envelope into a canonical event.
///
/// Envelopes without a string `type` discriminator, or whose discriminator
/// matches no rule, carry only bookkeeping and produce no event.
pub fn classify(envelope: &Value) -> Option<AgentEvent> {
    let kind = envelope.get("type").and_then(Value::as_str)?;

    let rule = RULES.iter().find(|rule| (rule.matches)(kind))?;
    (rule.extract)(envelope)
}

fn is_error_kind(kind: &str) -> bool {
    kind == "error"
}

fn is_text_kind(kind: &str) -> bool {
    matches!(kind, "text-delta" | "text_delta" | "text")
}

fn is_tool_call_kind(kind: &str) -> bool {
    matches!(kind, "tool-call" | "tool_call")
}

fn is_tool_result_kind(kind: &str) -> bool {
    matches!(kind, "tool-result" | "tool_result" | "tool-output")
}

// Only the top-level finish marker terminates the stream. Step-level
// markers ("step-finish", "finish-step") fire between tool rounds and
// must fall through unmatched.
fn is_finish_kind(kind: &str) -> bool {
    matches!(kind, "finish" | "done")
}

/// Producers disagree on where the event body nests: prefer `payload`,
/// then `data`, falling back to the envelope itself.
fn body(envelope: &Value) -> &Value {
    envelope
        .get("payload")
        .or_else(|| envelope.get("data"))
        .unwrap_or(envelope)
}

/// First string value found under any of the given keys.
fn str_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| value.get(*key).and_then(Value::as_str))
}

fn extract_error(envelope: &Value) -> Option<AgentEvent> {
    let body = body(envelope);

    let message = body
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .or_else(|| str_field(body, &["message"]))
        .or_else(|| str_field(envelope, &["message"]))
        .unwrap_or(GENERIC_ERROR_MESSAGE);

    Some(AgentEvent::StreamError {
        message: message.to_string(),
    })
}

fn extract_text(envelope: &Value) -> Option<AgentEvent> {
    let body = body(envelope);

    let text = match body.get("text").and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => match body.get("content") {
            Some(Value::String(content)) => content.clone(),
            Some(Value::Array(parts)) => parts
                .iter()
                .filter(|part| part.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect(),
            // No recognizable text field: not the same as an empty delta.
            _ => return None,
        },
    };

    if text.is_empty() {
        return None;
    }

    Some(AgentEvent::ContentDelta { text })
}

fn extract_tool_call(envelope: &Value) -> Option<AgentEvent> {
    let body = body(envelope);

    let name = str_field(body, &["toolName", "name", "tool_name"]);
    let id = str_field(body, &["toolCallId", "id", "tool_call_id"]);

    let (name, id) = match (name, id) {
        (Some(name), Some(id)) => (name, id),
        _ => {
            tracing::debug!("Dropping tool-call envelope without a resolvable name and id");
            return None;
        }
    };

    let arguments = ["args", "arguments", "input"]
        .iter()
        .find_map(|key| body.get(*key))
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    Some(AgentEvent::ToolCallStarted {
        tool_call_id: id.to_string(),
        tool_name: name.to_string(),
        arguments,
    })
}

fn extract_tool_result(envelope: &Value) -> Option<AgentEvent> {
    let body = body(envelope);

    // Producers disagree on nesting, so the id is also looked up on the
    // outer envelope before giving up.
    let id = str_field(body, &["toolCallId", "tool_call_id", "id"])
        .or_else(|| str_field(envelope, &["toolCallId", "id"]));

    let id = match id {
        Some(id) => id,
        None => {
            // An orphaned result cannot be attached to anything.
            tracing::debug!("Dropping tool result with no recoverable tool call id");
            return None;
        }
    };

    let result = body
        .get("result")
        .or_else(|| body.get("content"))
        .cloned()
        .unwrap_or_else(|| body.clone());

    let is_error = body.get("isError").map(is_truthy).unwrap_or(false)
        || body.get("error").map(is_truthy).unwrap_or(false);

    Some(AgentEvent::ToolResultReceived {
        tool_call_id: id.to_string(),
        result,
        is_error,
    })
}

fn extract_finish(_envelope: &Value) -> Option<AgentEvent> {
    Some(AgentEvent::StreamFinished)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
