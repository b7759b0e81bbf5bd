use crate::api::error::AppError;
use crate::models::custom_resource::{CustomResourceRequest, CustomResourceResponse, RequestType};
use crate::services::listing::ListingService;
use crate::services::telegram::BotApi;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Handles the provisioning-time custom resource that wires Telegram to this handler
pub struct RegistrationService {
    bot: Arc<dyn BotApi>,
    listing: Arc<ListingService>,
    public_url: Option<String>,
}

impl RegistrationService {
    pub fn new(
        bot: Arc<dyn BotApi>,
        listing: Arc<ListingService>,
        public_url: Option<String>,
    ) -> Self {
        Self {
            bot,
            listing,
            public_url,
        }
    }

    pub async fn handle(&self, request: CustomResourceRequest) -> CustomResourceResponse {
        let physical_id = request.physical_resource_id();
        info!("🔗 Webhook registration request: {:?}", request.request_type);

        match request.request_type {
            RequestType::Create | RequestType::Update => {
                let webhook_url = match self.register(&request).await {
                    Ok(url) => url,
                    Err(e) => {
                        error!("{}", e);
                        return CustomResourceResponse::failed(physical_id, e.to_string());
                    }
                };

                // First deployment publishes an initial (possibly empty) index
                if request.request_type == RequestType::Create {
                    match self.listing.regenerate_index().await {
                        Ok(summary) => info!(
                            "Initial static website created ({} files)",
                            summary.file_count
                        ),
                        Err(e) => error!("Failed to create initial static website: {}", e),
                    }
                }

                info!("✅ Webhook registered: {}", webhook_url);
                let mut data = BTreeMap::new();
                data.insert(
                    "Message".to_string(),
                    "Webhook registered successfully".to_string(),
                );
                data.insert("WebhookUrl".to_string(), webhook_url);
                CustomResourceResponse::success(physical_id, data)
            }
            RequestType::Delete => {
                // Stack teardown must not be blocked by Telegram
                if let Err(e) = self.bot.delete_webhook().await {
                    warn!("Failed to remove webhook: {}", e);
                }
                let mut data = BTreeMap::new();
                data.insert("Message".to_string(), "Webhook removed".to_string());
                CustomResourceResponse::success(physical_id, data)
            }
        }
    }

    async fn register(&self, request: &CustomResourceRequest) -> Result<String, AppError> {
        let webhook_url = self
            .public_url
            .clone()
            .or_else(|| request.webhook_url().map(str::to_string))
            .ok_or_else(|| {
                AppError::Registration(
                    "no public URL configured and no WebhookUrl property supplied".to_string(),
                )
            })?;

        self.bot
            .set_webhook(&webhook_url)
            .await
            .map_err(|e| AppError::Registration(e.to_string()))?;

        Ok(webhook_url)
    }
}
