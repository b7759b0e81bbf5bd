use crate::config::ConfigError;
use crate::models::HttpResponse;
use crate::utils::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Telegram rejected the webhook URL; fatal to the deployment
    #[error("Webhook registration failed: {0}")]
    Registration(String),

    #[error("Download failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Listing regeneration failed: {0}")]
    ListingRegeneration(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch { .. } | AppError::Telegram(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-visible JSON error; server-side failures are logged and masked
    pub fn into_http_response(self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("{}", self);
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::json(status, &json!({ "error": message }))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_http_response().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_errors_are_masked() {
        let response = AppError::Storage("AccessDenied: bucket secret-bucket".to_string())
            .into_http_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.body.contains("secret-bucket"));
    }

    #[test]
    fn test_bad_request_is_visible() {
        let response = AppError::BadRequest("Invalid HTTP event".to_string()).into_http_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.body.contains("Invalid HTTP event"));
    }

    #[test]
    fn test_fetch_error_names_url() {
        let err = AppError::Fetch {
            url: "https://example.com/book.pdf".to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Download failed for https://example.com/book.pdf: HTTP 404 Not Found"
        );
    }
}
