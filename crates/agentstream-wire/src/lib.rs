pub mod decode;
pub mod envelope;
pub mod event;
pub mod interpret;
pub mod stream;

pub use decode::LineDecoder;
pub use envelope::{parse_line, Envelope, DATA_MARKER, DONE_SENTINEL};
pub use event::AgentEvent;
pub use interpret::{classify, GENERIC_ERROR_MESSAGE};
pub use stream::{parse_agent_stream, ChunkStream, EventStream};
