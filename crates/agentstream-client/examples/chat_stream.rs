use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use agentstream_client::{AgentClient, ChatConfig, ChatHandler, ThreadController};

struct ConsoleHandler;

impl ChatHandler for ConsoleHandler {
    fn on_content(&mut self, text: &str) {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn on_tool_call(&mut self, tool_name: &str, tool_call_id: &str, _arguments: &Value) {
        println!("\n[tool call] {tool_name} ({tool_call_id})");
    }

    fn on_tool_result(&mut self, tool_call_id: &str, _result: &Value, is_error: bool) {
        let status = if is_error { "failed" } else { "ok" };
        println!("[tool result] {tool_call_id}: {status}");
    }

    fn on_done(&mut self) {
        println!("\n[done]");
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("\n[error] {message}");
    }

    fn on_thread_created(&mut self, thread_id: &str) {
        println!("[thread] {thread_id}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("Agentstream - Chat Stream Example");
    println!("=================================\n");

    // 1. Point the client at the agent backend
    let base_url =
        std::env::var("AGENT_BASE_URL").unwrap_or_else(|_| "http://localhost:4111".to_string());
    let agent = std::env::var("AGENT_NAME").unwrap_or_else(|_| "weatherAgent".to_string());

    println!("1. Connecting to {base_url} (agent: {agent})...");
    let client = Arc::new(AgentClient::new(&base_url, &agent)?);

    // 2. A controller owns the thread identity and the active session
    let config = ChatConfig::new("example-cli");
    let mut controller = ThreadController::new(client.clone(), client, config);

    // 3. Send a message and stream the reply to the console
    println!("2. Sending message...\n");
    controller.send_message("What's the weather in Lisbon today?", ConsoleHandler);

    let state = controller.join_active().await?;
    println!("\n3. Session finished: {state:?}");
    println!("   Conversation now holds {} messages", controller.messages().len());

    Ok(())
}
