use crate::models::{HandlerResponse, HttpResponse};
use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!("Dropping invalid response header {}", name),
            }
        }

        (status, headers, self.body).into_response()
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        match self {
            HandlerResponse::Http(response) => response.into_response(),
            HandlerResponse::CustomResource(response) => Json(response).into_response(),
        }
    }
}
