pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

pub use memory::MemoryScreenshotStore;
pub use s3::S3ScreenshotStore;

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "object not found"),
            StoreError::Backend(msg) => write!(f, "{msg}"),
        }
    }
}

/// Object store holding screenshot evidence. Screenshots are written
/// once at submission time and read back only through the single-use
/// token endpoint.
#[async_trait]
pub trait ScreenshotStore: Send + Sync {
    async fn upload(&self, key: &str, content_type: &str, data: Bytes) -> Result<(), StoreError>;
    async fn download(&self, key: &str) -> Result<Bytes, StoreError>;
    /// Public URL a stored key is addressable under; this is what gets
    /// persisted on the submission row.
    fn public_url(&self, key: &str) -> String;
}

/// Extract the object key from a stored screenshot URL. Only URLs
/// inside the screenshots store are accepted.
pub fn screenshot_key(url: &str) -> Option<&str> {
    let (_, key) = url.split_once("/screenshots/")?;
    if key.is_empty() { None } else { Some(key) }
}

/// Infer a content type from the object path's file extension.
/// Unrecognized or absent extensions default to JPEG.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}
