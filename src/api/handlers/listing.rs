use crate::AppState;
use crate::models::InboundEvent;
use axum::{extract::State, response::IntoResponse};

/// `GET /`: file listing with presigned links
pub async fn list_files(State(state): State<AppState>) -> impl IntoResponse {
    state.handler.handle(InboundEvent::ListingRequest).await
}
