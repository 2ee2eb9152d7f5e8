use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ScreenshotStore, StoreError};

/// In-memory store for tests; see the S3 implementation for the real one.
#[derive(Default)]
pub struct MemoryScreenshotStore {
    objects: Mutex<HashMap<String, (String, Bytes)>>,
    public_base_url: String,
}

impl MemoryScreenshotStore {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn insert(&self, key: &str, content_type: &str, data: Bytes) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), data));
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ScreenshotStore for MemoryScreenshotStore {
    async fn upload(&self, key: &str, content_type: &str, data: Bytes) -> Result<(), StoreError> {
        self.insert(key, content_type, data);
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Bytes, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, data)| data.clone())
            .ok_or(StoreError::NotFound)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}
