use serde_json::Value;

/// Upward callbacks from the core to its host UI.
///
/// All methods default to no-ops so a host implements only what it renders.
/// Callbacks arrive in the exact order their source lines appeared in the
/// byte stream, and never again once the session is cancelled.
pub trait ChatHandler: Send {
    /// Incremental assistant text, including inline error notices.
    fn on_content(&mut self, _text: &str) {}

    fn on_tool_call(&mut self, _tool_name: &str, _tool_call_id: &str, _arguments: &Value) {}

    fn on_tool_result(&mut self, _tool_call_id: &str, _result: &Value, _is_error: bool) {}

    /// The stream reached Closed. Fired at most once per session.
    fn on_done(&mut self) {}

    /// Transport failure or producer-signaled stream error.
    fn on_error(&mut self, _message: &str) {}

    /// A thread id was generated for this surface. One-shot per thread.
    fn on_thread_created(&mut self, _thread_id: &str) {}
}
