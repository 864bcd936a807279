// ABOUTME: In-memory image store for tests and ephemeral deployments
// ABOUTME: Blobs live in a concurrent map and vanish with the process

use super::{new_key, url_for, ImageStore, StoredImage};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use image::ImageFormat;
use recipe_core::errors::AppResult;

/// Image blobs held in process memory
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    blobs: DashMap<String, Bytes>,
    url_prefix: String,
}

impl MemoryImageStore {
    /// Create an empty store serving under `url_prefix`
    #[must_use]
    pub fn new(url_prefix: String) -> Self {
        Self {
            blobs: DashMap::new(),
            url_prefix,
        }
    }

    /// Number of blobs currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, bytes: Bytes, format: ImageFormat) -> AppResult<StoredImage> {
        let key = new_key(format);
        self.blobs.insert(key.clone(), bytes);
        Ok(StoredImage {
            url: url_for(&self.url_prefix, &key),
            key,
        })
    }

    async fn get(&self, key: &str) -> AppResult<Option<Bytes>> {
        Ok(self.blobs.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        Ok(self.blobs.remove(key).is_some())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
