pub mod api;
pub mod config;
pub mod handler;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::handler::WebhookHandler;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<WebhookHandler>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(api::handlers::listing::list_files).post(api::handlers::webhook::receive_update),
        )
        .route(
            "/custom-resource",
            post(api::handlers::registration::custom_resource),
        )
        .route("/health", get(api::handlers::health::health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
