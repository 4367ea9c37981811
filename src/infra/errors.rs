// src/infra/errors.rs — Error types for Chátmosphere

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    // Client → relay
    #[error("Could not reach relay: {0}")]
    Transport(String),

    #[error("Relay returned HTTP {status}: {message}")]
    Relay { status: u16, message: String },

    #[error("Relay reply could not be parsed: {0}")]
    MalformedReply(String),

    // Relay → provider
    #[error("Upstream provider returned HTTP {status}")]
    Upstream {
        status: u16,
        details: serde_json::Value,
    },

    #[error("No API key configured. Set {env_var} in the environment or a .env file.")]
    NoApiKey { env_var: String },

    // Store
    #[error("Session '{id}' not found")]
    SessionNotFound { id: String },

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatError {
    /// Failures of a single chat exchange. These become the apology message
    /// in the conversation instead of propagating.
    pub fn is_exchange_failure(&self) -> bool {
        matches!(
            self,
            ChatError::Transport(_)
                | ChatError::Relay { .. }
                | ChatError::MalformedReply(_)
                | ChatError::Upstream { .. }
        )
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ChatError::MalformedReply(e.to_string())
        } else {
            ChatError::Transport(e.to_string())
        }
    }
}
