use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use agentstream_wire::ChunkStream;

use crate::message::Message;

/// One outbound message on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.text.clone(),
        }
    }
}

/// Body of the outbound stream request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    pub messages: Vec<WireMessage>,
    pub run_id: String,
    pub thread_id: String,
    pub resource_id: String,
}

/// Seam between the session controller and the network, so sessions can be
/// driven from scripted chunk streams in tests.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Issue the outbound streaming request and hand back its byte chunks.
    async fn open_stream(&self, request: &StreamRequest) -> Result<ChunkStream>;
}

/// HTTP client for the agent backend (direct, no SDK).
pub struct AgentClient {
    http_client: reqwest::Client,
    base_url: String,
    agent: String,
}

impl AgentClient {
    pub fn new(base_url: impl Into<String>, agent: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: agent.into(),
        })
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl StreamTransport for AgentClient {
    async fn open_stream(&self, request: &StreamRequest) -> Result<ChunkStream> {
        let response = self
            .http_client
            .post(format!("{}/api/agents/{}/stream", self.base_url, self.agent))
            .json(request)
            .send()
            .await
            .context("Failed to send stream request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Agent API error ({}): {}", status, error_text);
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| anyhow::anyhow!("Stream error: {}", e))
        })))
    }
}
