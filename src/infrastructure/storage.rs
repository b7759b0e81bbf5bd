use crate::config::Config;
use crate::services::storage::S3StorageService;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &Config) -> Arc<S3StorageService> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let aws_config = loader.load().await;

    // Custom endpoints (MinIO, LocalStack) need path-style addressing
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.s3_endpoint.is_some())
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    info!(
        "☁️  S3 Storage: {} (Bucket: {})",
        config
            .s3_endpoint
            .as_deref()
            .unwrap_or(config.aws_region.as_str()),
        config.bucket
    );

    Arc::new(S3StorageService::new(s3_client, config.bucket.clone()))
}
