// src/provider/mod.rs — Upstream completion provider used by the relay

pub mod openrouter;

use async_trait::async_trait;

use crate::infra::errors::ChatError;

pub use openrouter::OpenRouterProvider;

/// Reply used when the provider answers without any choice text.
pub const EMPTY_REPLY: &str = "No reply from AI.";

/// Turns one user message into one assistant reply.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn complete(&self, message: &str) -> Result<String, ChatError>;
}
