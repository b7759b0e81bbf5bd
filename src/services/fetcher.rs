//! Downloads of user-supplied URLs.

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("file too large (max {}MB)", .0 / 1024 / 1024)]
    TooLarge(usize),

    #[error("transfer failed: {0}")]
    Transfer(String),
}

#[derive(Debug)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Plain GET with a whole-request timeout and a hard cap on body size.
/// The body is fully buffered before returning, so callers never store a partial download.
pub struct UrlFetcher {
    client: Client,
    timeout: Duration,
    max_size: usize,
}

impl UrlFetcher {
    pub fn new(timeout: Duration, max_size: usize) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bookshelf-bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_size,
        })
    }

    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedFile, FetchError> {
        let url = url::Url::parse(raw_url.trim())
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_size as u64 {
                return Err(FetchError::TooLarge(self.max_size));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.classify(e))?;
            if bytes.len() + chunk.len() > self.max_size {
                return Err(FetchError::TooLarge(self.max_size));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedFile {
            bytes,
            content_type,
        })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if e.is_connect() {
            FetchError::Unreachable(e.without_url().to_string())
        } else {
            FetchError::Transfer(e.without_url().to_string())
        }
    }
}
