use crate::AppState;
use crate::models::{CustomResourceRequest, InboundEvent};
use axum::{Json, extract::State, response::IntoResponse};

/// `POST /custom-resource`: lets a local run exercise the provisioning lifecycle
pub async fn custom_resource(
    State(state): State<AppState>,
    Json(request): Json<CustomResourceRequest>,
) -> impl IntoResponse {
    state
        .handler
        .handle(InboundEvent::Registration(request))
        .await
}
