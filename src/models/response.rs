use crate::models::custom_resource::CustomResourceResponse;
use axum::http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

/// HTTP-shaped result, serializable as a Lambda Function URL response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, content_type: &str, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        Self {
            status_code: status.as_u16(),
            headers,
            body: body.into(),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, mime::TEXT_PLAIN_UTF_8.as_ref(), body)
    }

    pub fn html(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, mime::TEXT_HTML_UTF_8.as_ref(), body)
    }

    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::new(status, mime::APPLICATION_JSON.as_ref(), body),
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    mime::APPLICATION_JSON.as_ref(),
                    r#"{"error":"Internal Server Error"}"#,
                )
            }
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What one invocation hands back to whoever invoked it
#[derive(Debug, Clone)]
pub enum HandlerResponse {
    Http(HttpResponse),
    CustomResource(CustomResourceResponse),
}

impl HandlerResponse {
    pub fn into_value(self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            HandlerResponse::Http(response) => serde_json::to_value(response),
            HandlerResponse::CustomResource(response) => serde_json::to_value(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_function_url_shape() {
        let response = HttpResponse::html(StatusCode::OK, "<p>hi</p>").with_header("Cache-Control", "no-cache");
        let value = HandlerResponse::Http(response).into_value().unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 200,
                "headers": {"Cache-Control": "no-cache", "Content-Type": "text/html; charset=utf-8"},
                "body": "<p>hi</p>"
            })
        );
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = HttpResponse::text(StatusCode::OK, "OK");
        assert_eq!(response.header("content-type"), Some("text/plain; charset=utf-8"));
    }
}
