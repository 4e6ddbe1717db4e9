use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use agentstream_wire::{classify, parse_line, AgentEvent, ChunkStream, Envelope, LineDecoder};

use crate::config::StreamErrorPolicy;
use crate::handler::ChatHandler;
use crate::message::Message;
use crate::reducer::{reduce, FALLBACK_ERROR_NOTICE};
use crate::transport::{StreamRequest, StreamTransport};

/// Lifecycle of one streaming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Open,
    /// Sentinel seen; about to close.
    Closing,
    Closed,
    Aborted,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Aborted | Self::Failed)
    }
}

/// Drives one stream from open to a terminal state: decode, parse, classify,
/// reduce, dispatch. Owns the cancellation token for the request.
///
/// Cancellation is checked before every dispatch, not only before every
/// read, so bytes already buffered when the token fires stay silent.
pub struct StreamSession {
    cancel: CancellationToken,
    state: SessionState,
    policy: StreamErrorPolicy,
}

impl StreamSession {
    pub fn new(policy: StreamErrorPolicy) -> Self {
        Self {
            cancel: CancellationToken::new(),
            state: SessionState::NotStarted,
            policy,
        }
    }

    /// Clone of the session's cancellation token. Cancelling it guarantees
    /// no further callback fires.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Consume the chunk stream until a terminal state, reducing events into
    /// the message and dispatching callbacks along the way.
    pub async fn run<H: ChatHandler>(
        &mut self,
        mut chunks: ChunkStream,
        mut message: Message,
        handler: &mut H,
    ) -> (SessionState, Message) {
        self.state = SessionState::Open;
        let mut decoder = LineDecoder::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.state = SessionState::Aborted;
                    return (self.state, message);
                }
                next = chunks.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for line in decoder.feed(&chunk) {
                        message = self.handle_line(&line, message, handler);
                        if self.state.is_terminal() {
                            return (self.state, message);
                        }
                    }
                }

                Some(Err(e)) => {
                    tracing::error!("Transport failure mid-stream: {:#}", e);
                    message = self.fail(&e.to_string(), message, handler);
                    return (self.state, message);
                }

                None => {
                    // End-of-input is a legitimate terminator, including
                    // after an error envelope. Flush the carry buffer first.
                    if let Some(line) = decoder.flush() {
                        message = self.handle_line(&line, message, handler);
                        if self.state.is_terminal() {
                            return (self.state, message);
                        }
                    }
                    self.close(handler);
                    return (self.state, message);
                }
            }
        }
    }

    fn handle_line<H: ChatHandler>(
        &mut self,
        line: &str,
        message: Message,
        handler: &mut H,
    ) -> Message {
        if self.cancel.is_cancelled() {
            self.state = SessionState::Aborted;
            return message;
        }

        match parse_line(line) {
            Envelope::Noise => message,
            Envelope::Sentinel => {
                self.state = SessionState::Closing;
                self.close(handler);
                message
            }
            Envelope::Payload(value) => match classify(&value) {
                Some(event) => self.dispatch(event, message, handler),
                None => message,
            },
        }
    }

    fn dispatch<H: ChatHandler>(
        &mut self,
        event: AgentEvent,
        mut message: Message,
        handler: &mut H,
    ) -> Message {
        match &event {
            AgentEvent::ContentDelta { text } => {
                message = reduce(message, &event);
                handler.on_content(text);
            }

            AgentEvent::ToolCallStarted {
                tool_call_id,
                tool_name,
                arguments,
            } => {
                handler.on_tool_call(tool_name, tool_call_id, arguments);
                message = reduce(message, &event);
            }

            AgentEvent::ToolResultReceived {
                tool_call_id,
                result,
                is_error,
            } => {
                handler.on_tool_result(tool_call_id, result, *is_error);
                message = reduce(message, &event);
            }

            AgentEvent::StreamError { message: error } => {
                // The error rides both channels: an inline notice through
                // the content path and the side-channel callback. It does
                // not close the stream unless the policy says so; the
                // producer is expected to finish or drop the connection.
                let notice = format!("**Error:** {error}");
                message = reduce(
                    message,
                    &AgentEvent::ContentDelta {
                        text: notice.clone(),
                    },
                );
                handler.on_content(&notice);
                handler.on_error(error);

                if self.policy == StreamErrorPolicy::Terminate {
                    self.state = SessionState::Failed;
                }
            }

            AgentEvent::StreamFinished => {
                self.close(handler);
            }
        }

        message
    }

    fn close<H: ChatHandler>(&mut self, handler: &mut H) {
        if !self.state.is_terminal() {
            self.state = SessionState::Closed;
            handler.on_done();
        }
    }

    fn fail<H: ChatHandler>(
        &mut self,
        error: &str,
        mut message: Message,
        handler: &mut H,
    ) -> Message {
        self.state = SessionState::Failed;

        if message.is_empty() {
            message = reduce(
                message,
                &AgentEvent::ContentDelta {
                    text: FALLBACK_ERROR_NOTICE.to_string(),
                },
            );
            handler.on_content(FALLBACK_ERROR_NOTICE);
        }
        handler.on_error(error);

        message
    }
}

/// Handle to a spawned session: cancel it or await its outcome.
pub struct SessionHandle {
    cancel: CancellationToken,
    task: JoinHandle<(SessionState, Message)>,
}

impl SessionHandle {
    /// Abort the session. No further callback fires after this returns,
    /// even for bytes already in flight.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the terminal state and the reconstructed assistant message.
    pub async fn join(self) -> Result<(SessionState, Message)> {
        self.task.await.context("Session task panicked")
    }
}

/// Open the request in the background and drive the session to completion.
pub fn spawn_session<H>(
    transport: Arc<dyn StreamTransport>,
    request: StreamRequest,
    message: Message,
    mut handler: H,
    policy: StreamErrorPolicy,
) -> SessionHandle
where
    H: ChatHandler + 'static,
{
    let mut session = StreamSession::new(policy);
    let cancel = session.cancellation_token();

    let task = tokio::spawn(async move {
        let token = session.cancellation_token();

        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => {
                return (SessionState::Aborted, message);
            }
            opened = transport.open_stream(&request) => opened,
        };

        match opened {
            Ok(chunks) => session.run(chunks, message, &mut handler).await,
            Err(e) => {
                tracing::error!("Failed to open agent stream: {:#}", e);
                let message = session.fail(&e.to_string(), message, &mut handler);
                (session.state(), message)
            }
        }
    });

    SessionHandle { cancel, task }
}
