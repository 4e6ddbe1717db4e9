use serde::{Deserialize, Serialize};

/// What a producer-signaled error envelope does to the session.
///
/// The observed backend notifies and keeps the connection open until it
/// finishes or closes on its own, so `NotifyOnly` is the default; hosts
/// that prefer failing fast opt into `Terminate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamErrorPolicy {
    #[default]
    NotifyOnly,
    Terminate,
}

/// Chat surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Identifies the calling surface to the agent backend.
    pub resource_id: String,

    #[serde(default)]
    pub error_policy: StreamErrorPolicy,
}

impl ChatConfig {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            error_policy: StreamErrorPolicy::default(),
        }
    }

    pub fn error_policy(mut self, policy: StreamErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_notify_only() {
        let config = ChatConfig::new("dashboard");
        assert_eq!(config.error_policy, StreamErrorPolicy::NotifyOnly);
    }

    #[test]
    fn test_policy_deserializes_with_default() {
        let config: ChatConfig = serde_json::from_str(r#"{"resource_id":"x"}"#).unwrap();
        assert_eq!(config.error_policy, StreamErrorPolicy::NotifyOnly);

        let config: ChatConfig =
            serde_json::from_str(r#"{"resource_id":"x","error_policy":"terminate"}"#).unwrap();
        assert_eq!(config.error_policy, StreamErrorPolicy::Terminate);
    }
}
