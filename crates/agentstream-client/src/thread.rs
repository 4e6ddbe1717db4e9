use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ChatConfig;
use crate::handler::ChatHandler;
use crate::history::{messages_from_value, ThreadStore};
use crate::message::Message;
use crate::session::{spawn_session, SessionHandle, SessionState};
use crate::transport::{StreamRequest, StreamTransport, WireMessage};

/// Persistent identity correlating a sequence of messages across sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            updated_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Owns the active thread identity for one chat surface and guarantees at
/// most one open stream session at a time: starting a new send cancels and
/// tears down the previous session first.
pub struct ThreadController {
    transport: Arc<dyn StreamTransport>,
    store: Arc<dyn ThreadStore>,
    config: ChatConfig,
    thread_id: Option<String>,
    thread_reported: bool,
    messages: Vec<Message>,
    active: Option<SessionHandle>,
}

impl ThreadController {
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        store: Arc<dyn ThreadStore>,
        config: ChatConfig,
    ) -> Self {
        Self {
            transport,
            store,
            config,
            thread_id: None,
            thread_reported: false,
            messages: Vec::new(),
            active: None,
        }
    }

    /// Resume an existing thread. Externally supplied ids are never
    /// re-announced through `on_thread_created`.
    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self.thread_reported = true;
        self
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// The in-memory conversation, oldest first. Excludes the in-flight
    /// assistant turn until its session terminates.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn has_active_session(&self) -> bool {
        self.active.is_some()
    }

    /// Send a user message and open a stream session for the reply.
    ///
    /// Lazily assigns a thread id on the first send and reports it through
    /// `on_thread_created` exactly once.
    pub fn send_message<H>(&mut self, text: impl Into<String>, mut handler: H)
    where
        H: ChatHandler + 'static,
    {
        // A still-open session is superseded: cancel before opening.
        self.cancel_active();

        let thread_id = match &self.thread_id {
            Some(id) => id.clone(),
            None => {
                let id = Uuid::new_v4().to_string();
                self.thread_id = Some(id.clone());
                id
            }
        };
        if !self.thread_reported {
            self.thread_reported = true;
            handler.on_thread_created(&thread_id);
        }

        self.messages.push(Message::user(text));

        let request = StreamRequest {
            messages: self.messages.iter().map(WireMessage::from).collect(),
            run_id: Uuid::new_v4().to_string(),
            thread_id,
            resource_id: self.config.resource_id.clone(),
        };

        self.active = Some(spawn_session(
            Arc::clone(&self.transport),
            request,
            Message::assistant(),
            handler,
            self.config.error_policy,
        ));
    }

    /// Await the active session. The finished assistant message joins the
    /// conversation unless the session was aborted.
    pub async fn join_active(&mut self) -> Result<Option<SessionState>> {
        let Some(handle) = self.active.take() else {
            return Ok(None);
        };

        let (state, message) = handle.join().await?;
        if state != SessionState::Aborted {
            self.messages.push(message);
        }
        Ok(Some(state))
    }

    /// Cancel the active session, if any. Silence, not a callback.
    pub fn cancel_active(&mut self) {
        if let Some(previous) = self.active.take() {
            previous.cancel();
        }
    }

    /// Switch to another thread: cancel the active session, discard the
    /// in-memory conversation, and load the new thread's history.
    pub async fn switch_thread(&mut self, thread_id: impl Into<String>) -> Result<()> {
        self.cancel_active();
        self.messages.clear();

        let id = thread_id.into();
        self.thread_id = Some(id.clone());
        self.thread_reported = true;

        let raw = self.store.load_thread_messages(&id).await?;
        self.messages = messages_from_value(raw);
        Ok(())
    }
}
