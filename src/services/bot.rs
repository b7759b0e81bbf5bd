use crate::api::error::AppError;
use crate::config::Config;
use crate::models::telegram::{Document, Message, Update, WebhookReply};
use crate::models::HttpResponse;
use crate::services::fetcher::UrlFetcher;
use crate::services::listing::ListingService;
use crate::services::storage::{ObjectUpload, StorageService};
use crate::services::telegram::BotApi;
use crate::utils::validation::{
    content_type_for, fallback_download_name, is_url, last_path_segment, object_key_for,
    sanitize_filename, validate_extension, validate_file_size,
};
use axum::http::StatusCode;
use chrono::Utc;
use percent_encoding::{CONTROLS, utf8_percent_encode};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const WELCOME_TEXT: &str = "🤖 *Bookshelf Bot*

📚 *What I can do:*
• Upload EPUB/PDF files directly
• Download files from URLs
• Store files in cloud storage

📎 *How to use:*
• Send me an EPUB or PDF file
• Send me a direct file URL (e.g. http://example.com/book.epub)
• Use /regenerate to update the static website";

pub const HELP_TEXT: &str = "🤖 *Available Commands:*

• /start - Welcome message and instructions
• /help - Show this help message
• /regenerate - Manually update the static website

📁 *File Management:*
• Send EPUB/PDF files directly
• Send direct download URLs (must end with .epub or .pdf)

💡 Website updates automatically on upload.";

/// Reply to anything that is neither an attachment, a URL nor a command
pub const USAGE_TEXT: &str = "Send /help for commands, upload a file, or send a direct file URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BotCommand {
    Start,
    Help,
    Regenerate,
}

impl BotCommand {
    /// Accepts `/cmd` and `/cmd@BotName`
    fn parse(text: &str) -> Option<Self> {
        let command = text.split_whitespace().next()?;
        let command = command.split('@').next()?;
        match command {
            "/start" => Some(BotCommand::Start),
            "/help" => Some(BotCommand::Help),
            "/regenerate" => Some(BotCommand::Regenerate),
            _ => None,
        }
    }
}

pub struct BotService {
    config: Config,
    bot: Arc<dyn BotApi>,
    storage: Arc<dyn StorageService>,
    fetcher: UrlFetcher,
    listing: Arc<ListingService>,
}

impl BotService {
    pub fn new(
        config: Config,
        bot: Arc<dyn BotApi>,
        storage: Arc<dyn StorageService>,
        listing: Arc<ListingService>,
    ) -> Result<Self, AppError> {
        let fetcher = UrlFetcher::new(config.download_timeout, config.max_file_size)?;
        Ok(Self {
            config,
            bot,
            storage,
            fetcher,
            listing,
        })
    }

    /// Always answers 200: Telegram redelivers anything else
    pub async fn handle_update(&self, update: Update) -> HttpResponse {
        let Some(message) = update.message else {
            return HttpResponse::text(StatusCode::OK, "OK");
        };
        let chat_id = message.chat.id;

        let reply = match self.dispatch(&message).await {
            Ok(reply) => reply,
            Err(AppError::Validation(e)) => {
                warn!("Rejected upload in chat {}: {} ({})", chat_id, e, e.code);
                WebhookReply::plain(chat_id, format!("❌ {}", e))
            }
            Err(e) => {
                error!("Error handling update {}: {}", update.update_id, e);
                WebhookReply::plain(chat_id, format!("❌ {}", e))
            }
        };

        HttpResponse::json(StatusCode::OK, &reply)
    }

    async fn dispatch(&self, message: &Message) -> Result<WebhookReply, AppError> {
        let chat_id = message.chat.id;

        if let Some(document) = &message.document {
            return self.store_attachment(chat_id, document).await;
        }

        let Some(text) = message.text.as_deref().map(str::trim) else {
            return Ok(WebhookReply::plain(chat_id, USAGE_TEXT));
        };

        match BotCommand::parse(text) {
            Some(BotCommand::Start) => Ok(WebhookReply::markdown(chat_id, WELCOME_TEXT)),
            Some(BotCommand::Help) => Ok(WebhookReply::markdown(chat_id, HELP_TEXT)),
            Some(BotCommand::Regenerate) => self.regenerate(chat_id).await,
            None if is_url(text) => self.store_url(chat_id, text).await,
            None => Ok(WebhookReply::plain(chat_id, USAGE_TEXT)),
        }
    }

    async fn store_attachment(
        &self,
        chat_id: i64,
        document: &Document,
    ) -> Result<WebhookReply, AppError> {
        let file_name = sanitize_filename(document.file_name.as_deref().unwrap_or("unknown_file"))?;
        if let Some(size) = document.file_size {
            validate_file_size(size, self.config.max_file_size)?;
        }
        validate_extension(&file_name, &self.config.allowed_extensions)?;

        let file_path = self
            .bot
            .get_file_path(&document.file_id)
            .await
            .map_err(|e| AppError::Telegram(e.to_string()))?;
        let bytes = self
            .bot
            .download_file(&file_path)
            .await
            .map_err(|e| AppError::Telegram(e.to_string()))?;
        validate_file_size(bytes.len() as u64, self.config.max_file_size)?;

        self.store(&file_name, bytes).await?;
        Ok(WebhookReply::plain(
            chat_id,
            format!("✅ File '{}' uploaded successfully!", file_name),
        ))
    }

    async fn store_url(&self, chat_id: i64, url: &str) -> Result<WebhookReply, AppError> {
        let file_name = match last_path_segment(url) {
            Some(segment) => sanitize_filename(&segment)?,
            None => fallback_download_name(Utc::now()),
        };
        validate_extension(&file_name, &self.config.allowed_extensions).map_err(|mut e| {
            e.message = format!("URL must point to a file of an accepted type. {}", e.message);
            e
        })?;

        self.notify(chat_id, "⬇️ Downloading from URL...").await;

        let fetched = self.fetcher.fetch(url).await.map_err(|e| AppError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        info!(
            "⬇️  Fetched {} bytes from {} ({})",
            fetched.bytes.len(),
            url,
            fetched.content_type.as_deref().unwrap_or("unknown type")
        );

        self.store(&file_name, fetched.bytes).await?;
        Ok(WebhookReply::plain(
            chat_id,
            format!("✅ File '{}' downloaded and saved!", file_name),
        ))
    }

    async fn regenerate(&self, chat_id: i64) -> Result<WebhookReply, AppError> {
        self.notify(chat_id, "🔄 Regenerating static website...").await;

        let summary = self.listing.regenerate_index().await?;
        Ok(WebhookReply::markdown(
            chat_id,
            format!(
                "✅ *Static website regenerated!*\n\n📊 *Statistics:*\n• Files indexed: {}\n• Total size: {:.1} MB",
                summary.file_count,
                summary.total_mb()
            ),
        ))
    }

    /// Upload under the derived key, then rebuild the static index on a best-effort basis
    async fn store(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let now = Utc::now();
        let key = object_key_for(file_name, now);
        // S3 user metadata must be ASCII
        let upload = ObjectUpload::new(content_type_for(file_name))
            .metadata(
                "original-filename",
                utf8_percent_encode(file_name, CONTROLS).to_string(),
            )
            .metadata("upload-timestamp", now.to_rfc3339());

        let size = bytes.len();
        self.storage
            .upload_file(&key, bytes, upload)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        info!("📦 Stored {} ({} bytes)", key, size);

        if let Err(e) = self.listing.regenerate_index().await {
            error!("Upload of {} kept, but {}", key, e);
        }

        Ok(key)
    }

    /// Progress message; failure to deliver it never aborts the request
    async fn notify(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.bot.send_message(chat_id, text, None).await {
            warn!("Failed to send progress message to chat {}: {}", chat_id, e);
        }
    }

    pub fn malformed(&self, reason: &str) -> HttpResponse {
        warn!("Ignoring malformed update: {}", reason);
        HttpResponse::json(
            StatusCode::OK,
            &serde_json::json!({ "ok": false, "error": "Malformed update" }),
        )
    }
}
