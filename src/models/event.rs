use crate::api::error::AppError;
use crate::models::custom_resource::CustomResourceRequest;
use crate::models::telegram::Update;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;

/// One invocation, classified once at the entry point
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// Custom-resource lifecycle callback from the provisioning system
    Registration(CustomResourceRequest),
    /// Plain GET on the public endpoint
    ListingRequest,
    /// Webhook delivery from Telegram
    BotUpdate(Box<Update>),
    /// POST whose body is not a Telegram update
    MalformedUpdate { reason: String },
    Unsupported { method: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionUrlRequest {
    #[serde(default)]
    request_context: RequestContext,
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RequestContext {
    #[serde(default)]
    http: HttpContext,
}

#[derive(Debug, Default, Deserialize)]
struct HttpContext {
    #[serde(default)]
    method: String,
}

impl InboundEvent {
    /// Classify a raw Lambda payload (custom-resource event or Function URL request)
    pub fn decode(payload: Value) -> Result<Self, AppError> {
        if payload.get("RequestType").is_some() && payload.get("ServiceToken").is_some() {
            let request: CustomResourceRequest = serde_json::from_value(payload).map_err(|e| {
                AppError::BadRequest(format!("Invalid custom resource event: {}", e))
            })?;
            return Ok(InboundEvent::Registration(request));
        }

        let request: FunctionUrlRequest = serde_json::from_value(payload)
            .map_err(|e| AppError::BadRequest(format!("Invalid HTTP event: {}", e)))?;

        match request.request_context.http.method.to_ascii_uppercase().as_str() {
            "GET" => Ok(InboundEvent::ListingRequest),
            "POST" => {
                let body = request.body.unwrap_or_default();
                if request.is_base64_encoded {
                    match STANDARD.decode(body.as_bytes()) {
                        Ok(bytes) => Ok(Self::from_update_body(&bytes)),
                        Err(e) => Ok(InboundEvent::MalformedUpdate {
                            reason: format!("Invalid base64 body: {}", e),
                        }),
                    }
                } else {
                    Ok(Self::from_update_body(body.as_bytes()))
                }
            }
            other => Ok(InboundEvent::Unsupported {
                method: other.to_string(),
            }),
        }
    }

    /// Classify a POST body; a body that is not an update never fails the request
    pub fn from_update_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Update>(body) {
            Ok(update) => InboundEvent::BotUpdate(Box::new(update)),
            Err(e) => InboundEvent::MalformedUpdate {
                reason: e.to_string(),
            },
        }
    }
}
