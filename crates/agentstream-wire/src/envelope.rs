use serde_json::Value;

/// Marker prefixing every data-carrying line.
pub const DATA_MARKER: &str = "data:";

/// Literal termination sentinel: no further data arrives after this.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of parsing one decoded line.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// The decoded JSON payload of a data line.
    Payload(Value),

    /// The stream-termination sentinel.
    Sentinel,

    /// Heartbeats, comments, and anything else that carries no payload.
    Noise,
}

/// Extract the payload from one line of the stream.
///
/// Noise is expected on this transport (keep-alives and comments share it),
/// so anything that is not a well-formed data line is dropped rather than
/// raised. Malformed JSON that still looked like a payload is logged.
pub fn parse_line(line: &str) -> Envelope {
    let trimmed = line.trim();
    let data = match trimmed.strip_prefix(DATA_MARKER) {
        Some(rest) => rest.trim(),
        None => return Envelope::Noise,
    };

    if data == DONE_SENTINEL {
        return Envelope::Sentinel;
    }

    if !data.starts_with('{') && !data.starts_with('[') {
        return Envelope::Noise;
    }

    match serde_json::from_str(data) {
        Ok(value) => Envelope::Payload(value),
        Err(e) => {
            tracing::debug!("Dropping malformed data line: {}", e);
            Envelope::Noise
        }
    }
}
