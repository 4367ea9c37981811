// src/api/handlers.rs

use crate::api::{types::*, RelayState};
use crate::infra::errors::ChatError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

/// POST /chat — Forward one message to the provider and return its reply.
pub async fn chat(
    State(state): State<RelayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ErrorResponse>)> {
    match state.provider.complete(&body.message).await {
        Ok(reply) => Ok(Json(ChatReply { reply })),
        Err(ChatError::Upstream { status, details }) => {
            tracing::error!(
                "{} API error (HTTP {}): {}",
                state.provider.id(),
                status,
                details
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch from OpenRouter".into(),
                    details: Some(details),
                }),
            ))
        }
        Err(e) => {
            tracing::error!("Relay error: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Something went wrong".into(),
                    details: None,
                }),
            ))
        }
    }
}
