use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::config::S3Config;

use super::{ScreenshotStore, StoreError};

pub struct S3ScreenshotStore {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3ScreenshotStore {
    pub async fn new(config: &S3Config) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&aws_config);

        // Custom endpoint + path-style access for MinIO/LocalStack.
        if let Some(ref endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        let client = S3Client::from_conf(builder.build());

        tracing::info!(bucket = %config.bucket, region = %config.region, "Screenshot store initialized");

        Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ScreenshotStore for S3ScreenshotStore {
    async fn upload(&self, key: &str, content_type: &str, data: Bytes) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("S3 put failed for {key}: {e}")))?;

        tracing::debug!(key = %key, "Screenshot uploaded");
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Bytes, StoreError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service = e.into_service_error();
                if service.is_no_such_key() {
                    StoreError::NotFound
                } else {
                    StoreError::Backend(format!("S3 get failed for {key}: {service}"))
                }
            })?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend(format!("S3 body read failed for {key}: {e}")))?;

        Ok(data.into_bytes())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}
