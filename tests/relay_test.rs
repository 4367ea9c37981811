// tests/relay_test.rs — Integration test: relay routes and the HTTP client against a live relay

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chatmosphere::api::{build_router, RelayState};
use chatmosphere::conversation::{
    ChatView, Conversation, HttpRelayClient, RelayClient, SidebarListing, APOLOGY_TEXT,
};
use chatmosphere::infra::errors::ChatError;
use chatmosphere::provider::CompletionProvider;
use chatmosphere::session::{KeyValueStorage, MemoryStorage, Session, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

enum MockProvider {
    Echo,
    Unauthorized,
    Unreachable,
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    async fn complete(&self, message: &str) -> Result<String, ChatError> {
        match self {
            MockProvider::Echo if message == "Hello" => Ok("Hi there!".into()),
            MockProvider::Echo => Ok(format!("echo: {message}")),
            MockProvider::Unauthorized => Err(ChatError::Upstream {
                status: 401,
                details: serde_json::json!({ "error": { "message": "No auth credentials found" } }),
            }),
            MockProvider::Unreachable => Err(ChatError::Transport("dns error".into())),
        }
    }
}

struct NullView;

impl ChatView for NullView {
    fn render_welcome(&mut self, _display_name: &str) {}
    fn render_conversation(&mut self, _session: &Session) {}
    fn render_sidebar(&mut self, _listing: &SidebarListing<'_>) {}
}

/// A static dir holding a minimal client shell and one asset.
fn static_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        "<!doctype html><title>Chátmosphere</title><div id=\"chatContainer\"></div>",
    )
    .unwrap();
    std::fs::write(dir.path().join("style.css"), "body { margin: 0; }").unwrap();
    dir
}

fn router(provider: MockProvider, dir: &TempDir) -> axum::Router {
    build_router(
        RelayState {
            provider: Arc::new(provider),
        },
        dir.path(),
    )
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_chat_returns_reply() {
    let dir = static_dir();
    let resp = router(MockProvider::Echo, &dir)
        .oneshot(chat_request(r#"{"message":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!({ "reply": "Hi there!" }));
}

#[tokio::test]
async fn test_upstream_error_becomes_500_with_details() {
    let dir = static_dir();
    let resp = router(MockProvider::Unauthorized, &dir)
        .oneshot(chat_request(r#"{"message":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Failed to fetch from OpenRouter");
    assert_eq!(body["details"]["error"]["message"], "No auth credentials found");
}

#[tokio::test]
async fn test_transport_error_is_generic() {
    let dir = static_dir();
    let resp = router(MockProvider::Unreachable, &dir)
        .oneshot(chat_request(r#"{"message":"Hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Something went wrong");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let dir = static_dir();
    let resp = router(MockProvider::Echo, &dir)
        .oneshot(chat_request(r#"{"text":"wrong field"}"#))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_path_serves_client_shell() {
    let dir = static_dir();
    let resp = router(MockProvider::Echo, &dir)
        .oneshot(
            Request::builder()
                .uri("/conversations/chat_123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("chatContainer"));
}

#[tokio::test]
async fn test_static_asset_served() {
    let dir = static_dir();
    let resp = router(MockProvider::Echo, &dir)
        .oneshot(Request::builder().uri("/style.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "body { margin: 0; }");
}

/// Serve `provider` on an ephemeral port and return its base URL.
async fn spawn_relay(provider: MockProvider, dir: &TempDir) -> String {
    let app = router(provider, dir);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_http_client_round_trip() {
    let dir = static_dir();
    let url = spawn_relay(MockProvider::Echo, &dir).await;
    let client = HttpRelayClient::new(&url, Duration::from_secs(5));
    assert_eq!(client.send("Hello").await.unwrap(), "Hi there!");
}

#[tokio::test]
async fn test_http_client_maps_500_to_relay_error() {
    let dir = static_dir();
    let url = spawn_relay(MockProvider::Unauthorized, &dir).await;
    let client = HttpRelayClient::new(&url, Duration::from_secs(5));
    match client.send("Hello").await {
        Err(ChatError::Relay { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected relay error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_conversation_over_live_relay() {
    let dir = static_dir();
    let ok_url = spawn_relay(MockProvider::Echo, &dir).await;
    let bad_url = spawn_relay(MockProvider::Unauthorized, &dir).await;
    let mut store = SessionStore::open(Box::new(MemoryStorage::new()), "User");
    let mut c = Conversation::new();

    let ok = HttpRelayClient::new(&ok_url, Duration::from_secs(5));
    c.submit(&mut store, &mut NullView, &ok, "Hello").await.unwrap();
    let bad = HttpRelayClient::new(&bad_url, Duration::from_secs(5));
    c.submit(&mut store, &mut NullView, &bad, "Are you there?")
        .await
        .unwrap();

    let texts: Vec<&str> = c
        .active_session(&store)
        .unwrap()
        .messages
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Hello", "Hi there!", "Are you there?", APOLOGY_TEXT]);
}

/// A relay stand-in whose `/chat` answers 200 with `body`.
async fn spawn_raw_relay(body: &'static str) -> String {
    let app = axum::Router::new().route("/chat", axum::routing::post(move || async move { body }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_http_client_rejects_non_json_success() {
    let url = spawn_raw_relay("definitely not json").await;
    let client = HttpRelayClient::new(&url, Duration::from_secs(5));
    match client.send("Hello").await {
        Err(ChatError::MalformedReply(_)) => {}
        other => panic!("expected malformed reply, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_shape_success_ends_in_apology() {
    let url = spawn_raw_relay(r#"{"text":"reply under the wrong field"}"#).await;
    let client = HttpRelayClient::new(&url, Duration::from_secs(5));
    assert!(matches!(
        client.send("Hello").await,
        Err(ChatError::MalformedReply(_))
    ));

    let mut store = SessionStore::open(Box::new(MemoryStorage::new()), "User");
    let mut c = Conversation::new();
    c.submit(&mut store, &mut NullView, &client, "Hello").await.unwrap();

    let reloaded: Vec<serde_json::Value> = serde_json::from_str(
        &store
            .storage()
            .get(&chatmosphere::session::storage::history_key("User"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(reloaded[0]["messages"][1]["text"], APOLOGY_TEXT);
    assert_eq!(reloaded[0]["messages"][1]["sender"], "assistant");
}
