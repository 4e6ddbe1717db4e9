use std::pin::Pin;

use anyhow::Result;
use futures::{Stream, StreamExt};

use crate::decode::LineDecoder;
use crate::envelope::{parse_line, Envelope};
use crate::event::AgentEvent;
use crate::interpret::classify;

/// Raw byte chunks as they arrive from the transport.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Boxed stream of canonical events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<AgentEvent>> + Send>>;

/// Turn a raw byte-chunk stream into canonical events.
///
/// The stream ends at the termination sentinel, at a top-level finish
/// marker (which is still yielded), or at end-of-input, flushing the carry
/// buffer as one final line. Transport errors pass through as `Err` items.
pub fn parse_agent_stream(chunks: ChunkStream) -> EventStream {
    Box::pin(async_stream::stream! {
        let mut chunks = chunks;
        let mut decoder = LineDecoder::new();
        let mut failed = false;

        'read: while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    for line in decoder.feed(&bytes) {
                        match parse_line(&line) {
                            Envelope::Noise => {}
                            Envelope::Sentinel => break 'read,
                            Envelope::Payload(value) => {
                                if let Some(event) = classify(&value) {
                                    let finished = matches!(event, AgentEvent::StreamFinished);
                                    yield Ok(event);
                                    if finished {
                                        break 'read;
                                    }
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    failed = true;
                    yield Err(e);
                    break 'read;
                }
            }
        }

        // A producer that closes without a trailing newline still gets its
        // last frame delivered. After a transport error the carry buffer is
        // a truncated frame and gets discarded instead.
        if !failed {
            if let Some(line) = decoder.flush() {
                if let Envelope::Payload(value) = parse_line(&line) {
                    if let Some(event) = classify(&value) {
                        yield Ok(event);
                    }
                }
            }
        }
    })
}
