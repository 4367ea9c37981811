// src/cli/serve.rs — `chatmosphere serve`

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{self, RelayState};
use crate::infra::config::Config;
use crate::provider::OpenRouterProvider;

pub async fn run_serve(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut relay = config.relay.clone();
    if let Some(host) = host {
        relay.host = host;
    }
    if let Some(port) = port {
        relay.port = port;
    }
    if let Some(dir) = static_dir {
        relay.static_dir = dir;
    }

    let provider = OpenRouterProvider::from_config(&relay)?;
    tracing::info!(
        "Forwarding /chat to {} (model {})",
        relay.upstream_url,
        provider.model()
    );

    let state = RelayState {
        provider: Arc::new(provider),
    };
    api::start_server(&relay, state).await
}
