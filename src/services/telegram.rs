use crate::config::Config;
use crate::models::telegram::{ApiResponse, File, ParseMode};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Outbound Telegram Bot API calls made by the handler
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Register `url` as the bot's webhook
    async fn set_webhook(&self, url: &str) -> Result<()>;

    /// Remove the registered webhook
    async fn delete_webhook(&self) -> Result<()>;

    /// Resolve an opaque file id to a server-side file path
    async fn get_file_path(&self, file_id: &str) -> Result<String>;

    /// Download a file previously resolved with `get_file_path`
    async fn download_file(&self, file_path: &str) -> Result<Vec<u8>>;

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()>;
}

/// reqwest-backed client; the token lives only in request paths, never in error text
pub struct TelegramClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
    download_timeout: Duration,
    max_file_size: usize,
}

impl TelegramClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;

        Ok(Self {
            http,
            api_url: config.telegram_api_url.trim_end_matches('/').to_string(),
            token: config.bot_token.clone(),
            download_timeout: config.download_timeout,
            max_file_size: config.max_file_size,
        })
    }

    fn too_large(&self) -> anyhow::Error {
        anyhow!(
            "File download aborted: larger than {}MB",
            self.max_file_size / 1024 / 1024
        )
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T, B>(&self, method: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("{} request failed: {}", method, e.without_url()))?;

        Self::unwrap_envelope(method, response).await
    }

    /// Telegram reports failures as `{"ok": false, "description": ..}`, often with a 4xx status
    async fn unwrap_envelope<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            anyhow!(
                "{} returned an unreadable response (HTTP {}): {}",
                method,
                status,
                e.without_url()
            )
        })?;

        if !envelope.ok {
            return Err(anyhow!(
                "{} rejected: {}",
                method,
                envelope
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status))
            ));
        }

        envelope
            .result
            .ok_or_else(|| anyhow!("{} returned no result", method))
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn set_webhook(&self, url: &str) -> Result<()> {
        let _: bool = self.call("setWebhook", &json!({ "url": url })).await?;
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<()> {
        let _: bool = self.call("deleteWebhook", &json!({})).await?;
        Ok(())
    }

    async fn get_file_path(&self, file_id: &str) -> Result<String> {
        let response = self
            .http
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .send()
            .await
            .map_err(|e| anyhow!("getFile request failed: {}", e.without_url()))?;

        let file: File = Self::unwrap_envelope("getFile", response).await?;
        file.file_path
            .ok_or_else(|| anyhow!("getFile returned no file_path for {}", file.file_id))
    }

    async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/file/bot{}/{}", self.api_url, self.token, file_path);
        let response = self
            .http
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| anyhow!("File download failed: {}", e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("File download failed: HTTP {}", status));
        }

        if response
            .content_length()
            .is_some_and(|length| length > self.max_file_size as u64)
        {
            return Err(self.too_large());
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| anyhow!("File download interrupted: {}", e.without_url()))?;
            if bytes.len() + chunk.len() > self.max_file_size {
                return Err(self.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = serde_json::to_value(mode)?;
        }

        let _: serde_json::Value = self.call("sendMessage", &body).await?;
        Ok(())
    }
}
