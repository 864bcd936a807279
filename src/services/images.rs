// ABOUTME: Image attachment service validating uploads by content and swapping references
// ABOUTME: Ownership is confirmed once before validation; a failed swap removes the new blob
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::AuthResult;
use crate::constants::entities::{INGREDIENT, RECIPE};
use crate::database::{Database, ImageSwap};
use crate::storage::ImageStore;
use bytes::Bytes;
use image::ImageFormat;
use recipe_core::errors::{AppError, AppResult};
use recipe_core::models::ImageRef;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Formats accepted for upload
const ACCEPTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// Entity an uploaded image is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageTarget {
    /// A recipe by id
    Recipe(i64),
    /// An ingredient by id
    Ingredient(i64),
}

impl ImageTarget {
    /// Identifier of the target entity
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Recipe(id) | Self::Ingredient(id) => *id,
        }
    }

    fn not_found(self) -> AppError {
        AppError::not_found(self.to_string())
    }
}

impl fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recipe(id) => write!(f, "{RECIPE} {id}"),
            Self::Ingredient(id) => write!(f, "{INGREDIENT} {id}"),
        }
    }
}

/// A target whose ownership has been confirmed for one caller.
///
/// Only [`ImageAttachmentService::ensure_target`] creates one, so `attach`
/// never repeats the ownership lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedTarget(ImageTarget);

impl OwnedTarget {
    /// The confirmed target
    #[must_use]
    pub const fn target(&self) -> ImageTarget {
        self.0
    }
}

/// Validates, stores, and attaches uploaded images
#[derive(Clone)]
pub struct ImageAttachmentService {
    database: Arc<Database>,
    store: Arc<dyn ImageStore>,
    max_upload_bytes: usize,
}

impl fmt::Debug for ImageAttachmentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachmentService")
            .field("store", &self.store.backend())
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

impl ImageAttachmentService {
    /// Create the service
    #[must_use]
    pub fn new(database: Arc<Database>, store: Arc<dyn ImageStore>, max_upload_bytes: usize) -> Self {
        Self {
            database,
            store,
            max_upload_bytes,
        }
    }

    /// Largest accepted payload in bytes
    #[must_use]
    pub const fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Confirm the caller owns the target before any payload is read
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for a missing or foreign target, or a
    /// repository error
    pub async fn ensure_target(
        &self,
        auth: &AuthResult,
        target: ImageTarget,
    ) -> AppResult<OwnedTarget> {
        let exists = match target {
            ImageTarget::Recipe(id) => self.database.recipes().exists(id, auth.user_id).await?,
            ImageTarget::Ingredient(id) => self
                .database
                .ingredients()
                .get(id, auth.user_id)
                .await?
                .is_some(),
        };
        if exists {
            Ok(OwnedTarget(target))
        } else {
            Err(target.not_found())
        }
    }

    /// Validate `payload` as an image and make it the target's current image.
    ///
    /// The previous image reference is replaced, never accumulated. Its blob
    /// is left in the store.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_IMAGE` for an oversized or undecodable payload,
    /// `RESOURCE_NOT_FOUND` if the target was deleted after it was confirmed,
    /// or a store/repository error
    pub async fn attach(
        &self,
        auth: &AuthResult,
        owned: OwnedTarget,
        payload: Bytes,
    ) -> AppResult<ImageRef> {
        let target = owned.target();
        let format = validate_image_blocking(payload.clone(), self.max_upload_bytes).await?;
        let stored: ImageRef = self.store.put(payload, format).await?.into();

        let swapped = match target {
            ImageTarget::Recipe(id) => {
                self.database
                    .recipes()
                    .replace_image(id, auth.user_id, &stored)
                    .await
            }
            ImageTarget::Ingredient(id) => {
                self.database
                    .ingredients()
                    .replace_image(id, auth.user_id, &stored)
                    .await
            }
        };

        match swapped {
            Ok(Some(ImageSwap { previous })) => {
                info!(
                    user.id = %auth.user_id,
                    target = %target,
                    image.key = %stored.key,
                    image.previous = previous.as_ref().map_or("none", |p| p.key.as_str()),
                    "Attached image"
                );
                Ok(stored)
            }
            Ok(None) => {
                self.discard(&stored).await;
                Err(target.not_found())
            }
            Err(e) => {
                self.discard(&stored).await;
                Err(e)
            }
        }
    }

    /// Best-effort removal of a blob whose reference was never recorded
    async fn discard(&self, image: &ImageRef) {
        if let Err(e) = self.store.delete(&image.key).await {
            warn!(image.key = %image.key, "Failed to remove unreferenced image: {}", e);
        }
    }
}

/// Run [`validate_image`] off the async runtime
async fn validate_image_blocking(payload: Bytes, max_bytes: usize) -> AppResult<ImageFormat> {
    tokio::task::spawn_blocking(move || validate_image(&payload, max_bytes))
        .await
        .map_err(|e| AppError::internal(format!("Image validation task failed: {e}")))?
}

/// Check a payload is a decodable image of an accepted format.
///
/// Detection is by content only; names and declared content types are not
/// consulted.
///
/// # Errors
///
/// Returns `INVALID_IMAGE` when the payload is empty, exceeds `max_bytes`,
/// has an unrecognized or unsupported format, or fails to decode
pub fn validate_image(payload: &[u8], max_bytes: usize) -> AppResult<ImageFormat> {
    if payload.is_empty() {
        return Err(AppError::invalid_image("Upload is empty"));
    }
    if payload.len() > max_bytes {
        return Err(AppError::invalid_image(format!(
            "Upload exceeds the {max_bytes} byte limit"
        ))
        .with_details(serde_json::json!({ "max_bytes": max_bytes })));
    }

    let format = image::guess_format(payload)
        .map_err(|_| AppError::invalid_image("Upload is not a recognized image format"))?;
    if !ACCEPTED_FORMATS.contains(&format) {
        return Err(AppError::invalid_image(format!(
            "Unsupported image format: {format:?}"
        )));
    }

    image::load_from_memory_with_format(payload, format)
        .map_err(|e| AppError::invalid_image(format!("Failed to decode image: {e}")))?;

    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::NewRecipe;
    use crate::storage::MemoryImageStore;
    use image::{DynamicImage, RgbImage};
    use recipe_core::errors::ErrorCode;
    use recipe_core::models::User;
    use rust_decimal::Decimal;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10])));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_valid_png_is_accepted() {
        assert_eq!(validate_image(&png_bytes(), 1024 * 1024).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_text_is_rejected() {
        let err = validate_image(b"definitely not an image", 1024).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImage);
    }

    #[test]
    fn test_truncated_png_is_rejected() {
        let bytes = png_bytes();
        let err = validate_image(&bytes[..bytes.len() / 2], 1024 * 1024).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImage);
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let bytes = png_bytes();
        let err = validate_image(&bytes, bytes.len() - 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImage);
        assert_eq!(err.details["max_bytes"], bytes.len() - 1);
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert_eq!(
            validate_image(&[], 10).unwrap_err().code,
            ErrorCode::InvalidImage
        );
    }

    async fn service_with_recipe() -> (ImageAttachmentService, Arc<MemoryImageStore>, AuthResult, i64) {
        let database = Arc::new(Database::in_memory().await.unwrap());
        let user = User::new("cook@example.com".to_owned(), None);
        database.users().create(&user).await.unwrap();
        let recipe = database
            .recipes()
            .create(
                user.id,
                &NewRecipe {
                    title: "Toast".to_owned(),
                    description: String::new(),
                    time_minutes: 3,
                    price: Decimal::ONE,
                    link: None,
                    tags: Vec::new(),
                    ingredients: Vec::new(),
                },
            )
            .await
            .unwrap();
        let store = Arc::new(MemoryImageStore::new("/media".to_owned()));
        let service = ImageAttachmentService::new(database, store.clone(), 1024 * 1024);
        let auth = AuthResult {
            user_id: user.id,
            email: user.email,
        };
        (service, store, auth, recipe.recipe.id)
    }

    #[tokio::test]
    async fn test_attach_uses_confirmed_target() {
        let (service, store, auth, recipe_id) = service_with_recipe().await;

        let owned = service
            .ensure_target(&auth, ImageTarget::Recipe(recipe_id))
            .await
            .unwrap();
        assert_eq!(owned.target(), ImageTarget::Recipe(recipe_id));

        let image = service
            .attach(&auth, owned, Bytes::from(png_bytes()))
            .await
            .unwrap();
        assert!(image.url.starts_with("/media/"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_target_deleted_after_confirmation_discards_blob() {
        let (service, store, auth, recipe_id) = service_with_recipe().await;
        let owned = service
            .ensure_target(&auth, ImageTarget::Recipe(recipe_id))
            .await
            .unwrap();

        assert!(service
            .database
            .recipes()
            .delete(recipe_id, auth.user_id)
            .await
            .unwrap());

        let err = service
            .attach(&auth, owned, Bytes::from(png_bytes()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_target_is_not_confirmed() {
        let (service, _store, _auth, recipe_id) = service_with_recipe().await;
        let stranger = AuthResult {
            user_id: uuid::Uuid::new_v4(),
            email: "stranger@example.com".to_owned(),
        };
        let err = service
            .ensure_target(&stranger, ImageTarget::Recipe(recipe_id))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ResourceNotFound);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(ImageTarget::Recipe(4).to_string(), "Recipe 4");
        assert_eq!(ImageTarget::Ingredient(9).id(), 9);
    }
}
