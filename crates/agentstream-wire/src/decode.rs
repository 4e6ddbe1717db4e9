use std::collections::VecDeque;

/// Accumulates raw byte chunks and yields complete newline-delimited lines.
///
/// Splitting happens at the byte level, so a multi-byte UTF-8 character cut
/// at a chunk boundary stays in the carry buffer until the rest of its line
/// arrives. Complete lines are decoded in one pass and never reordered.
pub struct LineDecoder {
    buffer: VecDeque<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_capacity(8192)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a chunk and drain every complete line it unlocked.
    /// The trailing fragment (possibly empty) stays buffered.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(decode_line(&line_bytes[..line_bytes.len() - 1]));
        }
        lines
    }

    /// At end-of-input, drain whatever is left as one final line.
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest: Vec<u8> = self.buffer.drain(..).collect();
        Some(decode_line(&rest))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let mut line = String::from_utf8_lossy(bytes).into_owned();
    if line.ends_with('\r') {
        line.pop();
    }
    line
}
