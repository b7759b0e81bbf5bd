use crate::AppState;
use crate::models::InboundEvent;
use axum::{body::Bytes, extract::State, response::IntoResponse};

/// `POST /`: Telegram webhook delivery. The raw body is decoded here so that
/// malformed payloads still get a 200 instead of an extractor rejection.
pub async fn receive_update(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    state
        .handler
        .handle(InboundEvent::from_update_body(&body))
        .await
}
