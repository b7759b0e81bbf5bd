use crate::handler::WebhookHandler;
use crate::models::{HandlerResponse, InboundEvent};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Serve the handler on the Lambda runtime API until the sandbox shuts down
pub async fn run(handler: Arc<WebhookHandler>) -> Result<(), Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move {
            info!("📥 Invocation {}", event.context.request_id);
            handle_event(&handler, event.payload).await
        }
    }))
    .await
}

/// Decode one raw payload, dispatch it, and encode the reply for the runtime
pub async fn handle_event(handler: &WebhookHandler, payload: Value) -> Result<Value, Error> {
    let response = match InboundEvent::decode(payload) {
        Ok(event) => handler.handle(event).await,
        Err(e) => {
            tracing::warn!("Undecodable event: {}", e);
            HandlerResponse::Http(e.into_http_response())
        }
    };

    Ok(response.into_value()?)
}
