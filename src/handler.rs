//! Single entry point shared by the Lambda runtime and the local HTTP server.

use crate::api::error::AppError;
use crate::config::Config;
use crate::models::{HandlerResponse, HttpResponse, InboundEvent};
use crate::services::bot::BotService;
use crate::services::listing::ListingService;
use crate::services::listing_page::render_error;
use crate::services::registration::RegistrationService;
use crate::services::storage::StorageService;
use crate::services::telegram::BotApi;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

pub struct WebhookHandler {
    registration: RegistrationService,
    bot: BotService,
    listing: Arc<ListingService>,
    storage: Arc<dyn StorageService>,
}

impl WebhookHandler {
    pub fn new(
        config: Config,
        storage: Arc<dyn StorageService>,
        bot_api: Arc<dyn BotApi>,
    ) -> Result<Self, AppError> {
        let listing = Arc::new(ListingService::new(
            storage.clone(),
            config.presign_expiry,
            config.listing_limit,
        ));
        let registration =
            RegistrationService::new(bot_api.clone(), listing.clone(), config.public_url.clone());
        let bot = BotService::new(config, bot_api, storage.clone(), listing.clone())?;

        Ok(Self {
            registration,
            bot,
            listing,
            storage,
        })
    }

    pub async fn handle(&self, event: InboundEvent) -> HandlerResponse {
        match event {
            InboundEvent::Registration(request) => {
                HandlerResponse::CustomResource(self.registration.handle(request).await)
            }
            InboundEvent::ListingRequest => HandlerResponse::Http(self.listing_page().await),
            InboundEvent::BotUpdate(update) => {
                HandlerResponse::Http(self.bot.handle_update(*update).await)
            }
            InboundEvent::MalformedUpdate { reason } => {
                HandlerResponse::Http(self.bot.malformed(&reason))
            }
            InboundEvent::Unsupported { method } => {
                tracing::warn!("Rejected {} request", method);
                HandlerResponse::Http(HttpResponse::json(
                    StatusCode::METHOD_NOT_ALLOWED,
                    &json!({ "error": "Method not allowed" }),
                ))
            }
        }
    }

    async fn listing_page(&self) -> HttpResponse {
        match self.listing.render_dynamic_page().await {
            Ok(html) => {
                HttpResponse::html(StatusCode::OK, html).with_header("Cache-Control", "no-cache")
            }
            Err(e) => {
                tracing::error!("Error serving file list: {}", e);
                HttpResponse::html(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    render_error("The file list is temporarily unavailable."),
                )
            }
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageService> {
        &self.storage
    }
}
