// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::ChatError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

/// `[relay]` — the `serve` side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// OpenAI-compatible base URL; `/chat/completions` is appended.
    pub upstream_url: String,
    pub model: String,
    /// Name of the environment variable holding the provider key.
    pub api_key_env: String,
    /// Directory with the single-page client (`index.html` + assets).
    pub static_dir: PathBuf,
    pub timeout_seconds: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            upstream_url: "https://openrouter.ai/api/v1".into(),
            model: "openai/gpt-4o-mini".into(),
            api_key_env: "OPENROUTER_API_KEY".into(),
            static_dir: PathBuf::from("public"),
            timeout_seconds: 60,
        }
    }
}

impl RelayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Read the provider key from the environment. The key never leaves
    /// the relay process.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// `[client]` — the terminal chat side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the relay; `/chat` is appended.
    pub relay_url: String,
    pub timeout_seconds: u64,
    /// Override for the key-value storage file.
    pub storage_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:3000".into(),
            timeout_seconds: 60,
            storage_path: None,
        }
    }
}

impl ClientConfig {
    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(paths::storage_path)
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ChatError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }
}
