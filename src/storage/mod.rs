// ABOUTME: Image store abstraction for uploaded recipe and ingredient images
// ABOUTME: Assigns stable keys to validated blobs and returns retrievable URLs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Image Storage
//!
//! Blobs are immutable once written. Replacing an entity's image writes a
//! new blob under a new key; the previous blob is left in place.

mod local;
mod memory;

pub use local::LocalImageStore;
pub use memory::MemoryImageStore;

use crate::config::environment::{ImageConfig, ImageStoreKind};
use async_trait::async_trait;
use bytes::Bytes;
use image::ImageFormat;
use recipe_core::errors::AppResult;
use recipe_core::models::ImageRef;
use std::sync::Arc;
use uuid::Uuid;

/// Location of a blob accepted by an [`ImageStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Stable identifier, `<hex uuid>.<extension>`
    pub key: String,
    /// URL the blob is retrievable from
    pub url: String,
}

impl From<StoredImage> for ImageRef {
    fn from(stored: StoredImage) -> Self {
        Self {
            key: stored.key,
            url: stored.url,
        }
    }
}

/// Binary blob storage for validated images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store a blob and return its key and URL
    async fn put(&self, bytes: Bytes, format: ImageFormat) -> AppResult<StoredImage>;

    /// Fetch a blob by key
    async fn get(&self, key: &str) -> AppResult<Option<Bytes>>;

    /// Remove a blob; returns false when it did not exist
    async fn delete(&self, key: &str) -> AppResult<bool>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}

/// Build the configured image store
#[must_use]
pub fn create_image_store(config: &ImageConfig) -> Arc<dyn ImageStore> {
    match config.store {
        ImageStoreKind::Local => Arc::new(LocalImageStore::new(
            config.media_root.clone(),
            config.url_prefix.clone(),
        )),
        ImageStoreKind::Memory => Arc::new(MemoryImageStore::new(config.url_prefix.clone())),
    }
}

/// Generate a fresh key carrying the format's canonical extension
pub(crate) fn new_key(format: ImageFormat) -> String {
    let extension = format.extensions_str().first().copied().unwrap_or("img");
    format!("{}.{extension}", Uuid::new_v4().simple())
}

/// Keys are `<32 lowercase hex>.<alphanumeric extension>`; nothing else
/// reaches the filesystem
pub(crate) fn is_valid_key(key: &str) -> bool {
    let Some((stem, extension)) = key.split_once('.') else {
        return false;
    };
    stem.len() == 32
        && stem.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && !extension.is_empty()
        && extension.len() <= 5
        && extension.bytes().all(|b| b.is_ascii_alphanumeric())
}

pub(crate) fn url_for(prefix: &str, key: &str) -> String {
    format!("{}/{key}", prefix.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_key_is_valid() {
        let key = new_key(ImageFormat::Png);
        assert!(key.ends_with(".png"));
        assert!(is_valid_key(&key));
        assert_ne!(key, new_key(ImageFormat::Png));
    }

    #[test]
    fn test_key_validation_rejects_traversal() {
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key("0123456789abcdef0123456789abcdef"));
        assert!(!is_valid_key("0123456789abcdef0123456789abcdef./"));
        assert!(!is_valid_key("0123456789ABCDEF0123456789abcdef.png"));
        assert!(is_valid_key("0123456789abcdef0123456789abcdef.jpg"));
    }

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("/media", "k.png"), "/media/k.png");
        assert_eq!(url_for("/media/", "k.png"), "/media/k.png");
    }
}
