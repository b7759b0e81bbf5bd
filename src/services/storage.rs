use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// One object as reported by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Headers and user metadata attached to a put
#[derive(Debug, Clone, Default)]
pub struct ObjectUpload {
    pub content_type: String,
    pub cache_control: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl ObjectUpload {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            ..Default::default()
        }
    }

    pub fn cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload_file(&self, key: &str, data: Vec<u8>, upload: ObjectUpload) -> Result<()>;
    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>>;
    async fn presigned_download_url(&self, key: &str, expires_in: Duration) -> Result<String>;
    async fn health_check(&self) -> Result<()>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn upload_file(&self, key: &str, data: Vec<u8>, upload: ObjectUpload) -> Result<()> {
        let res = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(upload.content_type)
            .set_cache_control(upload.cache_control)
            .set_metadata(Some(upload.metadata).filter(|m| !m.is_empty()))
            .send()
            .await;

        if let Err(e) = res {
            tracing::error!(
                "S3 put_object failed: bucket={}, key={}, error={:?}",
                self.bucket,
                key,
                e
            );
            return Err(e.into());
        }
        Ok(())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let res = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token)
                .send()
                .await?;

            if let Some(contents) = res.contents {
                for object in contents {
                    let Some(key) = object.key else { continue };
                    let last_modified = object.last_modified.and_then(|d| {
                        DateTime::from_timestamp(d.secs(), d.subsec_nanos())
                    });
                    objects.push(StoredObject {
                        key,
                        size: object.size.unwrap_or(0),
                        last_modified,
                    });
                }
            }

            continuation_token = next_page_token(res.is_truncated, res.next_continuation_token);
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }

    async fn presigned_download_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        let presign_config = PresigningConfig::builder().expires_in(expires_in).build()?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await?;

        Ok(presigned.uri().to_string())
    }

    async fn health_check(&self) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Bucket not accessible: {}", e))?;
        Ok(())
    }
}

/// Token for the following page; a truncated page without one ends the listing
/// instead of restarting it from the first page
fn next_page_token(is_truncated: Option<bool>, token: Option<String>) -> Option<String> {
    if is_truncated.unwrap_or(false) {
        token
    } else {
        None
    }
}
