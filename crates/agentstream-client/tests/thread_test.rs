use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use agentstream_client::{
    ChatConfig, ChatHandler, Role, SessionState, StreamRequest, StreamTransport, ThreadController,
    ThreadStore,
};
use agentstream_wire::ChunkStream;

/// Hands out pre-scripted chunk streams in order and records every request.
struct ScriptedTransport {
    streams: Mutex<VecDeque<ChunkStream>>,
    requests: Mutex<Vec<Value>>,
}

impl ScriptedTransport {
    fn new(streams: Vec<ChunkStream>) -> Self {
        Self {
            streams: Mutex::new(streams.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn open_stream(&self, request: &StreamRequest) -> Result<ChunkStream> {
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request)?);
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted stream left"))
    }
}

struct FakeStore {
    threads: HashMap<String, Value>,
}

#[async_trait]
impl ThreadStore for FakeStore {
    async fn load_thread_messages(&self, thread_id: &str) -> Result<Value> {
        Ok(self
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or(Value::Null))
    }
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ChatHandler for Recorder {
    fn on_content(&mut self, text: &str) {
        self.push(format!("content:{text}"));
    }

    fn on_done(&mut self) {
        self.push("done".to_string());
    }

    fn on_error(&mut self, message: &str) {
        self.push(format!("error:{message}"));
    }

    fn on_thread_created(&mut self, thread_id: &str) {
        self.push(format!("thread:{thread_id}"));
    }
}

fn reply(text: &str) -> ChunkStream {
    let chunks = vec![
        format!("data: {{\"type\":\"text-delta\",\"payload\":{{\"text\":\"{text}\"}}}}\n"),
        "data: [DONE]\n".to_string(),
    ];
    Box::pin(futures::stream::iter(
        chunks.into_iter().map(|c| Ok(c.into_bytes())),
    ))
}

fn config() -> ChatConfig {
    ChatConfig::new("dashboard")
}

#[tokio::test]
async fn test_thread_id_generated_once_and_announced_once() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        reply("hello"),
        reply("again"),
    ]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller = ThreadController::new(transport.clone(), store, config());
    let recorder = Recorder::default();

    controller.send_message("hi", recorder.clone());
    let first_id = controller.thread_id().unwrap().to_string();
    assert_eq!(controller.join_active().await.unwrap(), Some(SessionState::Closed));

    controller.send_message("more", recorder.clone());
    assert_eq!(controller.thread_id().unwrap(), first_id);
    assert_eq!(controller.join_active().await.unwrap(), Some(SessionState::Closed));

    let announcements: Vec<_> = recorder
        .events()
        .into_iter()
        .filter(|e| e.starts_with("thread:"))
        .collect();
    assert_eq!(announcements, vec![format!("thread:{first_id}")]);

    // Both requests carried the same thread id but fresh run ids.
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["threadId"], first_id.as_str());
    assert_eq!(requests[1]["threadId"], first_id.as_str());
    assert_ne!(requests[0]["runId"], requests[1]["runId"]);
}

#[tokio::test]
async fn test_request_carries_full_history() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        reply("hello"),
        reply("again"),
    ]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller = ThreadController::new(transport.clone(), store, config());

    controller.send_message("first question", Recorder::default());
    controller.join_active().await.unwrap();
    controller.send_message("second question", Recorder::default());
    controller.join_active().await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0]["messages"].as_array().unwrap().len(), 1);

    // Second request replays the whole conversation so far.
    let second = requests[1]["messages"].as_array().unwrap();
    assert_eq!(second.len(), 3);
    assert_eq!(second[0]["content"], "first question");
    assert_eq!(second[1]["role"], "assistant");
    assert_eq!(second[1]["content"], "hello");
    assert_eq!(second[2]["content"], "second question");
}

#[tokio::test]
async fn test_new_send_supersedes_open_session() {
    // The first session's stream never yields, so it is still open when the
    // second send arrives.
    let stalled: ChunkStream = Box::pin(futures::stream::pending());
    let transport = Arc::new(ScriptedTransport::new(vec![stalled, reply("again")]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller = ThreadController::new(transport, store, config());

    let first = Recorder::default();
    let second = Recorder::default();

    controller.send_message("one", first.clone());
    assert!(controller.has_active_session());

    // Let the first task open its stream before superseding it.
    tokio::time::sleep(Duration::from_millis(10)).await;

    controller.send_message("two", second.clone());
    assert!(controller.has_active_session());
    assert_eq!(controller.join_active().await.unwrap(), Some(SessionState::Closed));

    // Give the cancelled task a moment to unwind.
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(first.events().iter().all(|e| e.starts_with("thread:")));
    assert!(second.events().contains(&"content:again".to_string()));
    assert!(second.events().contains(&"done".to_string()));
}

#[tokio::test]
async fn test_join_appends_assistant_message() {
    let transport = Arc::new(ScriptedTransport::new(vec![reply("hello")]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller = ThreadController::new(transport, store, config());

    controller.send_message("hi", Recorder::default());
    controller.join_active().await.unwrap();

    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text, "hi");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].text, "hello");
}

#[tokio::test]
async fn test_join_without_active_session() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller = ThreadController::new(transport, store, config());

    assert_eq!(controller.join_active().await.unwrap(), None);
}

#[tokio::test]
async fn test_with_thread_suppresses_announcement() {
    let transport = Arc::new(ScriptedTransport::new(vec![reply("hello")]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller =
        ThreadController::new(transport, store, config()).with_thread("t-existing");
    let recorder = Recorder::default();

    controller.send_message("hi", recorder.clone());
    controller.join_active().await.unwrap();

    assert_eq!(controller.thread_id(), Some("t-existing"));
    assert!(recorder.events().iter().all(|e| !e.starts_with("thread:")));
}

#[tokio::test]
async fn test_switch_thread_loads_history_and_cancels() {
    let stalled: ChunkStream = Box::pin(futures::stream::pending());
    let transport = Arc::new(ScriptedTransport::new(vec![stalled]));
    let mut threads = HashMap::new();
    threads.insert(
        "t-2".to_string(),
        json!([
            {"id": "m1", "role": "user", "content": "earlier question"},
            {"id": "m2", "role": "assistant", "content": "earlier answer"}
        ]),
    );
    let store = Arc::new(FakeStore { threads });
    let mut controller = ThreadController::new(transport, store, config());

    controller.send_message("in flight", Recorder::default());
    assert!(controller.has_active_session());

    controller.switch_thread("t-2").await.unwrap();

    assert!(!controller.has_active_session());
    assert_eq!(controller.thread_id(), Some("t-2"));
    let messages = controller.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "earlier question");
    assert_eq!(messages[1].text, "earlier answer");
}

#[tokio::test]
async fn test_switch_to_thread_with_no_history() {
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller = ThreadController::new(transport, store, config());

    // The store returns null for unknown threads; that is an empty thread,
    // not an error.
    controller.switch_thread("t-unknown").await.unwrap();
    assert!(controller.messages().is_empty());
    assert_eq!(controller.thread_id(), Some("t-unknown"));
}

#[tokio::test]
async fn test_transport_open_failure_fails_session() {
    // No scripted stream queued, so open_stream errors.
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let store = Arc::new(FakeStore {
        threads: HashMap::new(),
    });
    let mut controller = ThreadController::new(transport, store, config());
    let recorder = Recorder::default();

    controller.send_message("hi", recorder.clone());
    assert_eq!(
        controller.join_active().await.unwrap(),
        Some(SessionState::Failed)
    );

    let events = recorder.events();
    assert!(events.iter().any(|e| e.starts_with("error:")));
    assert!(!events.contains(&"done".to_string()));
}
