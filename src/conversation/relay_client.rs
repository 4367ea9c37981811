// src/conversation/relay_client.rs — Client side of `POST /chat`

use async_trait::async_trait;
use std::time::Duration;

use crate::api::types::{ChatReply, ChatRequest};
use crate::infra::config::ClientConfig;
use crate::infra::errors::ChatError;

/// Sends one message to the relay and returns the reply text.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, ChatError>;
}

pub struct HttpRelayClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRelayClient {
    pub fn new(relay_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("HTTP client setup failed ({}); using defaults without timeout", e);
                reqwest::Client::new()
            });
        Self {
            endpoint: format!("{}/chat", relay_url.trim_end_matches('/')),
            client,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            &config.relay_url,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Relay {
                status: status.as_u16(),
                message: body,
            });
        }

        // Decode failures surface as MalformedReply through From<reqwest::Error>
        let reply: ChatReply = response.json().await?;
        Ok(reply.reply)
    }
}
