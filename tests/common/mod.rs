#![allow(dead_code)]

use async_trait::async_trait;
use bookshelf_bot::config::Config;
use bookshelf_bot::handler::WebhookHandler;
use bookshelf_bot::services::storage::{ObjectUpload, StorageService, StoredObject};
use bookshelf_bot::services::telegram::TelegramClient;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use wiremock::MockServer;

pub const TOKEN: &str = "123456:TEST-TOKEN";
pub const BUCKET: &str = "bookshelf-test";

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub upload: ObjectUpload,
    pub last_modified: DateTime<Utc>,
}

/// In-memory bucket. Every put gets a strictly increasing timestamp so ordering is deterministic.
pub struct MockStorageService {
    files: Mutex<HashMap<String, StoredBlob>>,
    clock: Mutex<DateTime<Utc>>,
    signatures: AtomicU64,
    rejected_keys: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            clock: Mutex::new(
                DateTime::parse_from_rfc3339("2026-01-02T10:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            signatures: AtomicU64::new(0),
            rejected_keys: Mutex::new(HashSet::new()),
            fail_listing: AtomicBool::new(false),
        }
    }

    /// `"*"` rejects every put
    pub fn reject_uploads_to(&self, key: &str) {
        self.rejected_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        let mut clock = self.clock.lock().unwrap();
        *clock += ChronoDuration::minutes(1);
        self.files.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                data: data.to_vec(),
                upload: ObjectUpload::new("application/pdf"),
                last_modified: *clock,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Keys of uploaded files, excluding the generated pages
    pub fn file_keys(&self) -> Vec<String> {
        self.keys()
            .into_iter()
            .filter(|k| k.starts_with("files/"))
            .collect()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload_file(
        &self,
        key: &str,
        data: Vec<u8>,
        upload: ObjectUpload,
    ) -> anyhow::Result<()> {
        let rejected = self.rejected_keys.lock().unwrap();
        if rejected.contains(key) || rejected.contains("*") {
            anyhow::bail!("AccessDenied: put {}", key);
        }
        drop(rejected);
        let mut clock = self.clock.lock().unwrap();
        *clock += ChronoDuration::minutes(1);
        self.files.lock().unwrap().insert(
            key.to_string(),
            StoredBlob {
                data,
                upload,
                last_modified: *clock,
            },
        );
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> anyhow::Result<Vec<StoredObject>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            anyhow::bail!("ListObjectsV2 failed: service unavailable");
        }
        Ok(self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, blob)| StoredObject {
                key: k.clone(),
                size: blob.data.len() as i64,
                last_modified: Some(blob.last_modified),
            })
            .collect())
    }

    async fn presigned_download_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        let signature = self.signatures.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://{}.s3.test/{}?X-Amz-Expires={}&X-Amz-Signature=sig{}",
            BUCKET,
            key,
            expires_in.as_secs(),
            signature
        ))
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub fn test_config(telegram: &MockServer) -> Config {
    let mut config = Config::new(TOKEN, BUCKET);
    config.telegram_api_url = telegram.uri();
    config.public_url = Some("https://hook.lambda-url.eu-west-3.on.aws/".to_string());
    config.download_timeout = Duration::from_millis(500);
    config.api_timeout = Duration::from_secs(2);
    config
}

pub fn build_handler(config: Config, storage: Arc<MockStorageService>) -> WebhookHandler {
    let telegram = Arc::new(TelegramClient::new(&config).unwrap());
    WebhookHandler::new(config, storage, telegram).unwrap()
}

pub fn text_update(chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": 1000,
        "message": {
            "message_id": 1,
            "chat": {"id": chat_id, "type": "private"},
            "text": text
        }
    })
}

pub fn document_update(chat_id: i64, file_id: &str, file_name: &str, file_size: u64) -> Value {
    json!({
        "update_id": 1001,
        "message": {
            "message_id": 2,
            "chat": {"id": chat_id, "type": "private"},
            "document": {"file_id": file_id, "file_name": file_name, "file_size": file_size}
        }
    })
}

pub fn method_path(method: &str) -> String {
    format!("/bot{}/{}", TOKEN, method)
}

pub fn file_path(path: &str) -> String {
    format!("/file/bot{}/{}", TOKEN, path)
}

/// Presigned URLs differ per call only in their query string
pub fn strip_query_strings(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_query = false;
    for c in html.chars() {
        match c {
            '?' => in_query = true,
            '"' if in_query => {
                in_query = false;
                out.push(c);
            }
            _ if in_query => {}
            _ => out.push(c),
        }
    }
    out
}
