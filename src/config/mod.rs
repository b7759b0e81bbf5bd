use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default upload limit: 20 MB (the Telegram `getFile` ceiling)
pub const DEFAULT_MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide configuration, read once at startup and injected into the handler
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (required)
    pub bot_token: String,

    /// Bucket holding uploaded files and the generated index (required)
    pub bucket: String,

    /// Public URL of this handler, registered as the Telegram webhook
    pub public_url: Option<String>,

    /// AWS region (default: "eu-west-3")
    pub aws_region: String,

    /// Custom S3 endpoint, e.g. MinIO for local runs
    pub s3_endpoint: Option<String>,

    /// Telegram Bot API base URL (default: "https://api.telegram.org")
    pub telegram_api_url: String,

    /// Maximum accepted upload size in bytes (default: 20 MB)
    pub max_file_size: usize,

    /// Lowercase extensions accepted for upload; empty accepts anything
    pub allowed_extensions: Vec<String>,

    /// Lifetime of presigned download links (default: 1 hour)
    pub presign_expiry: Duration,

    /// Timeout for user-supplied URL downloads and file transfers (default: 25s)
    pub download_timeout: Duration,

    /// Timeout for Telegram API method calls (default: 10s)
    pub api_timeout: Duration,

    /// Maximum number of files shown on listing pages; `None` lists everything
    pub listing_limit: Option<usize>,
}

impl Config {
    /// Configuration with defaults for everything but the two required values
    pub fn new(bot_token: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            bucket: bucket.into(),
            public_url: None,
            aws_region: "eu-west-3".to_string(),
            s3_endpoint: None,
            telegram_api_url: "https://api.telegram.org".to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: vec!["epub".to_string(), "pdf".to_string()],
            presign_expiry: Duration::from_secs(3600),
            download_timeout: Duration::from_secs(25),
            api_timeout: Duration::from_secs(10),
            listing_limit: None,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let bucket = lookup("BUCKET_NAME")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("BUCKET_NAME"))?;

        let default = Self::new(bot_token, bucket);

        let public_url = match lookup("PUBLIC_URL").filter(|v| !v.trim().is_empty()) {
            Some(raw) => {
                url::Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
                    name: "PUBLIC_URL",
                    reason: e.to_string(),
                })?;
                Some(raw.trim().to_string())
            }
            None => None,
        };

        Ok(Self {
            public_url,

            aws_region: lookup("AWS_REGION").unwrap_or(default.aws_region),

            s3_endpoint: lookup("S3_ENDPOINT").filter(|v| !v.trim().is_empty()),

            telegram_api_url: lookup("TELEGRAM_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.telegram_api_url),

            max_file_size: lookup("MAX_FILE_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            allowed_extensions: lookup("ALLOWED_EXTENSIONS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_extensions),

            presign_expiry: lookup("PRESIGN_EXPIRY_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.presign_expiry),

            download_timeout: lookup("DOWNLOAD_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.download_timeout),

            api_timeout: lookup("API_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.api_timeout),

            listing_limit: lookup("LISTING_LIMIT")
                .and_then(|v| v.parse().ok())
                .filter(|limit: &usize| *limit > 0),

            ..default
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("BOT_TOKEN", "t"), ("BUCKET_NAME", "b")])).unwrap();
        assert_eq!(config.max_file_size, 20 * 1024 * 1024);
        assert_eq!(config.allowed_extensions, vec!["epub", "pdf"]);
        assert_eq!(config.presign_expiry, Duration::from_secs(3600));
        assert_eq!(config.aws_region, "eu-west-3");
        assert!(config.public_url.is_none());
        assert!(config.listing_limit.is_none());
    }

    #[test]
    fn test_missing_required() {
        let err = Config::from_lookup(lookup_from(&[("BUCKET_NAME", "b")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BOT_TOKEN")));

        let err = Config::from_lookup(lookup_from(&[("BOT_TOKEN", "t"), ("BUCKET_NAME", " ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("BUCKET_NAME")));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "t"),
            ("BUCKET_NAME", "b"),
            ("PUBLIC_URL", "https://abc.lambda-url.eu-west-3.on.aws/"),
            ("TELEGRAM_API_URL", "http://127.0.0.1:8081/"),
            ("ALLOWED_EXTENSIONS", ".EPUB, mobi,,"),
            ("MAX_FILE_SIZE", "1024"),
            ("LISTING_LIMIT", "50"),
            ("PRESIGN_EXPIRY_SECS", "60"),
        ]))
        .unwrap();
        assert_eq!(
            config.public_url.as_deref(),
            Some("https://abc.lambda-url.eu-west-3.on.aws/")
        );
        assert_eq!(config.telegram_api_url, "http://127.0.0.1:8081");
        assert_eq!(config.allowed_extensions, vec!["epub", "mobi"]);
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.listing_limit, Some(50));
        assert_eq!(config.presign_expiry, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_public_url() {
        let err = Config::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "t"),
            ("BUCKET_NAME", "b"),
            ("PUBLIC_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PUBLIC_URL", .. }));
    }
}
