pub mod config;
pub mod grouping;
pub mod handler;
pub mod history;
pub mod message;
pub mod reducer;
pub mod session;
pub mod thread;
pub mod transport;

pub use config::{ChatConfig, StreamErrorPolicy};
pub use grouping::{project, GroupedBlock, ToolCallView, ToolResultView};
pub use handler::ChatHandler;
pub use history::{messages_from_value, ThreadStore};
pub use message::{ContentBlock, Message, Role};
pub use reducer::{reduce, FALLBACK_ERROR_NOTICE};
pub use session::{spawn_session, SessionHandle, SessionState, StreamSession};
pub use thread::{Thread, ThreadController};
pub use transport::{AgentClient, StreamRequest, StreamTransport, WireMessage};
