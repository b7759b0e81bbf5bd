use crate::api::error::AppError;
use crate::services::listing_page::{
    self, DYNAMIC_PAGE, ERROR_PAGE, ListingEntry, STATIC_PAGE,
};
use crate::services::storage::{ObjectUpload, StorageService, StoredObject};
use crate::utils::html::encode_key_path;
use crate::utils::validation::FILES_PREFIX;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Fixed key of the generated static listing; never produced by an upload
pub const INDEX_KEY: &str = "index.html";
pub const ERROR_PAGE_KEY: &str = "error.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSummary {
    pub file_count: usize,
    pub total_bytes: i64,
}

impl IndexSummary {
    pub fn total_mb(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }
}

pub struct ListingService {
    storage: Arc<dyn StorageService>,
    presign_expiry: Duration,
    limit: Option<usize>,
}

impl ListingService {
    pub fn new(
        storage: Arc<dyn StorageService>,
        presign_expiry: Duration,
        limit: Option<usize>,
    ) -> Self {
        Self {
            storage,
            presign_expiry,
            limit,
        }
    }

    /// Stored files, newest first (ties broken by key so output is stable)
    pub async fn stored_files(&self) -> Result<Vec<StoredObject>, AppError> {
        let mut objects = self
            .storage
            .list_objects(FILES_PREFIX)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        objects.retain(|o| !o.key.ends_with('/'));
        objects.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.key.cmp(&b.key))
        });
        if let Some(limit) = self.limit {
            objects.truncate(limit);
        }
        Ok(objects)
    }

    /// Listing page with freshly presigned links
    pub async fn render_dynamic_page(&self) -> Result<String, AppError> {
        let objects = self.stored_files().await?;

        let mut entries = Vec::with_capacity(objects.len());
        for object in objects {
            let href = self
                .storage
                .presigned_download_url(&object.key, self.presign_expiry)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
            entries.push(to_entry(object, href));
        }

        Ok(listing_page::render_page(&entries, &DYNAMIC_PAGE))
    }

    /// Rebuild `index.html` (and `error.html`) with relative links, replacing the previous copy
    pub async fn regenerate_index(&self) -> Result<IndexSummary, AppError> {
        let objects = self
            .stored_files()
            .await
            .map_err(|e| AppError::ListingRegeneration(e.to_string()))?;

        let entries: Vec<ListingEntry> = objects
            .into_iter()
            .map(|object| {
                let href = encode_key_path(&object.key);
                to_entry(object, href)
            })
            .collect();

        let summary = IndexSummary {
            file_count: entries.len(),
            total_bytes: entries.iter().map(|e| e.size).sum(),
        };

        let html = listing_page::render_page(&entries, &STATIC_PAGE);
        let upload = ObjectUpload::new(mime::TEXT_HTML_UTF_8.as_ref())
            .cache_control("max-age=300")
            .metadata("generated-at", Utc::now().to_rfc3339())
            .metadata("file-count", summary.file_count.to_string());

        self.storage
            .upload_file(INDEX_KEY, html.into_bytes(), upload)
            .await
            .map_err(|e| AppError::ListingRegeneration(e.to_string()))?;

        info!("📄 Static index regenerated with {} files", summary.file_count);

        let error_page = ObjectUpload::new(mime::TEXT_HTML_UTF_8.as_ref()).cache_control("max-age=3600");
        if let Err(e) = self
            .storage
            .upload_file(ERROR_PAGE_KEY, ERROR_PAGE.as_bytes().to_vec(), error_page)
            .await
        {
            tracing::error!("Failed to write {}: {}", ERROR_PAGE_KEY, e);
        }

        Ok(summary)
    }
}

fn to_entry(object: StoredObject, href: String) -> ListingEntry {
    let filename = object
        .key
        .rsplit('/')
        .next()
        .unwrap_or(&object.key)
        .to_string();

    ListingEntry {
        filename,
        href,
        size: object.size,
        last_modified: object.last_modified,
    }
}
