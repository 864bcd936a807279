// ABOUTME: Filesystem-backed image store writing blobs under a media root
// ABOUTME: Writes go through a temp file and rename so readers never see partial blobs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{is_valid_key, new_key, url_for, ImageStore, StoredImage};
use async_trait::async_trait;
use bytes::Bytes;
use image::ImageFormat;
use recipe_core::errors::{AppError, AppResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// Image blobs stored as files named by key
#[derive(Clone, Debug)]
pub struct LocalImageStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalImageStore {
    /// Create a store rooted at `root`, serving under `url_prefix`
    #[must_use]
    pub const fn new(root: PathBuf, url_prefix: String) -> Self {
        Self { root, url_prefix }
    }

    /// Directory blobs are written to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the media root if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub async fn ensure_root(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::from(e).with_details(serde_json::json!({
                "path": self.root.display().to_string()
            }))
        })
    }

    fn path_for_key(&self, key: &str) -> AppResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(AppError::invalid_input(format!("Invalid image key: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, bytes: Bytes, format: ImageFormat) -> AppResult<StoredImage> {
        self.ensure_root().await?;
        let key = new_key(format);
        let path = self.path_for_key(&key)?;
        let tmp = self
            .root
            .join(format!(".{key}.tmp-{}", Uuid::new_v4().simple()));

        let mut file = tokio::fs::File::create(&tmp).await?;
        let written = async {
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        drop(file);

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(image.key = %key, image.bytes = bytes.len(), "Stored image on disk");
        Ok(StoredImage {
            url: url_for(&self.url_prefix, &key),
            key,
        })
    }

    async fn get(&self, key: &str) -> AppResult<Option<Bytes>> {
        let path = self.path_for_key(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let path = self.path_for_key(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().join("media"), "/media".to_owned());

        let stored = store
            .put(Bytes::from_static(b"blob"), ImageFormat::Png)
            .await
            .unwrap();
        assert!(stored.url.starts_with("/media/"));
        assert!(stored.url.ends_with(".png"));
        assert!(dir.path().join("media").join(&stored.key).exists());

        let data = store.get(&stored.key).await.unwrap().unwrap();
        assert_eq!(&data[..], b"blob");

        assert!(store.delete(&stored.key).await.unwrap());
        assert!(!store.delete(&stored.key).await.unwrap());
        assert!(store.get(&stored.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().to_path_buf(), "/media".to_owned());
        store
            .put(Bytes::from_static(b"x"), ImageFormat::Jpeg)
            .await
            .unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_rejects_unsafe_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().to_path_buf(), "/media".to_owned());
        assert!(store.get("../secret").await.is_err());
    }
}
