// src/api/mod.rs — The relay: one chat route plus the single-page client

pub mod handlers;
pub mod types;

use axum::routing::post;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::infra::config::RelayConfig;
use crate::provider::CompletionProvider;
pub use types::{ChatReply, ChatRequest, ErrorResponse};

/// Shared state for relay handlers.
#[derive(Clone)]
pub struct RelayState {
    pub provider: Arc<dyn CompletionProvider>,
}

/// Build the axum router. Any path other than `POST /chat` is served from
/// `static_dir`, and unknown paths get `index.html` so the client can route.
pub fn build_router(state: RelayState, static_dir: &Path) -> Router {
    let shell = ServeFile::new(static_dir.join("index.html"));
    let assets = ServeDir::new(static_dir).fallback(shell);

    Router::new()
        .route("/chat", post(handlers::chat))
        .fallback_service(assets)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the relay and run until Ctrl-C.
pub async fn start_server(config: &RelayConfig, state: RelayState) -> anyhow::Result<()> {
    let addr = config.bind_addr();
    let router = build_router(state, &config.static_dir);

    if !config.static_dir.join("index.html").exists() {
        tracing::warn!(
            "No index.html in {}; non-API paths will return 404",
            config.static_dir.display()
        );
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Relay listening on http://{addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down relay");
        })
        .await?;
    Ok(())
}
