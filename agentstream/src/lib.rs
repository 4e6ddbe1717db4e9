//! # Agentstream - Streaming Chat Client for Agent Backends
//!
//! Agentstream consumes the newline-delimited SSE-style streams produced by
//! tool-augmented agent backends and turns them into typed events, live
//! callbacks, and a reconstructed conversation:
//! - **Frame decoding** (byte chunks to frames, resilient to chunk splits)
//! - **Event interpretation** (duck-typed envelopes to a closed event set)
//! - **Stream sessions** (lifecycle, cancellation, error fallbacks)
//! - **Conversation state** (messages, tool call/result pairing)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use agentstream::prelude::*;
//!
//! struct Printer;
//!
//! impl ChatHandler for Printer {
//!     fn on_content(&mut self, text: &str) {
//!         print!("{}", text);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(AgentClient::new("http://localhost:4111", "weatherAgent")?);
//!     let config = ChatConfig::new("my-app");
//!
//!     let mut controller = ThreadController::new(client.clone(), client, config);
//!     controller.send_message("What's the weather in Lisbon?", Printer);
//!     controller.join_active().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Agentstream consists of two composable crates:
//!
//! - **agentstream-wire**: frame decoding, envelope parsing, and event
//!   classification over raw byte streams
//! - **agentstream-client**: stream sessions, the conversation reducer and
//!   grouping projector, thread management, and the HTTP transport
//!
//! The wire layer is also usable on its own when a host wants typed events
//! without the session machinery:
//!
//! ```rust,no_run
//! use agentstream::wire::{parse_agent_stream, AgentEvent, ChunkStream};
//! use futures::StreamExt;
//!
//! async fn consume(chunks: ChunkStream) -> anyhow::Result<()> {
//!     let mut events = parse_agent_stream(chunks);
//!     while let Some(event) = events.next().await {
//!         if let AgentEvent::ContentDelta { text } = event? {
//!             print!("{}", text);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub use agentstream_client as client;
pub use agentstream_wire as wire;

// Most-used types at the root
pub use agentstream_client::{
    AgentClient, ChatConfig, ChatHandler, ContentBlock, GroupedBlock, Message, Role,
    SessionHandle, SessionState, StreamErrorPolicy, Thread, ThreadController,
};
pub use agentstream_wire::AgentEvent;

/// Convenience prelude with everything a typical host needs.
pub mod prelude {
    pub use agentstream_client::{
        project, AgentClient, ChatConfig, ChatHandler, ContentBlock, GroupedBlock, Message, Role,
        SessionHandle, SessionState, StreamErrorPolicy, StreamRequest, StreamTransport, Thread,
        ThreadController, ThreadStore,
    };
    pub use agentstream_wire::{AgentEvent, ChunkStream, EventStream};
}
