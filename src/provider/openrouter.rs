// src/provider/openrouter.rs — OpenAI-compatible chat completions (OpenRouter by default)

use async_trait::async_trait;
use std::time::Duration;

use super::{CompletionProvider, EMPTY_REPLY};
use crate::infra::config::RelayConfig;
use crate::infra::errors::ChatError;

pub struct OpenRouterProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("HTTP client setup failed ({}); using defaults without timeout", e);
                reqwest::Client::new()
            });
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client,
        }
    }

    /// Build from `[relay]` config, reading the key from the environment.
    pub fn from_config(config: &RelayConfig) -> Result<Self, ChatError> {
        let api_key = config.api_key().ok_or_else(|| ChatError::NoApiKey {
            env_var: config.api_key_env.clone(),
        })?;
        Ok(Self::new(
            api_key,
            config.upstream_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Pull the first choice's text out of a chat-completions body.
pub fn extract_reply(body: &serde_json::Value) -> String {
    body["choices"][0]["message"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(EMPTY_REPLY)
        .to_string()
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn id(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, message: &str) -> Result<String, ChatError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": message }],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(
                "User-Agent",
                format!("chatmosphere/{}", env!("CARGO_PKG_VERSION")),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let details = serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::Value::String(text));
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let resp: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| ChatError::MalformedReply(format!("Failed to parse response: {e}")))?;

        Ok(extract_reply(&resp))
    }
}
