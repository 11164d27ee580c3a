//! Image Store
//!
//! Product images are sent by the admin UI as base64 data URLs and hosted
//! by an external service. [`ImageStore`] is the seam:
//!
//! - [`CloudinaryImageStore`] - signed uploads to Cloudinary (reqwest)
//! - [`MemoryImageStore`] - in-process store for tests and credential-less setups

mod cloudinary;
mod memory;

pub use cloudinary::{CloudinaryConfig, CloudinaryImageStore};
pub use memory::MemoryImageStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Image store errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid base64 image format")]
    InvalidFormat,

    #[error("Failed to upload image: {0}")]
    Upload(String),

    #[error("Failed to delete image: {0}")]
    Delete(String),

    #[error("Image service error: {0}")]
    Service(String),
}

impl From<reqwest::Error> for ImageError {
    fn from(err: reqwest::Error) -> Self {
        ImageError::Service(err.to_string())
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InvalidFormat => {
                AppError::with_message(ErrorCode::InvalidImage, err.to_string())
            }
            ImageError::Upload(_) => AppError::with_message(
                ErrorCode::ImageUploadFailed,
                format!("Failed to upload images: {err}"),
            ),
            ImageError::Delete(_) | ImageError::Service(_) => {
                AppError::with_message(ErrorCode::ImageServiceError, err.to_string())
            }
        }
    }
}

pub type ImageResult<T> = Result<T, ImageError>;

/// A hosted image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
    pub format: String,
    pub bytes: u64,
}

/// External image hosting
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload one base64 data URL into `folder`
    async fn upload(&self, data_url: &str, folder: &str) -> ImageResult<UploadedImage>;

    /// Delete by public id
    async fn delete(&self, public_id: &str) -> ImageResult<()>;

    /// Whether `url` points at an image hosted by this store
    fn is_hosted_url(&self, url: &str) -> bool;

    /// Public id of a hosted URL
    fn public_id(&self, url: &str) -> Option<String> {
        public_id_from_url(url)
    }
}

/// Upload several images concurrently; fails if any upload fails
pub async fn upload_many(
    store: &dyn ImageStore,
    data_urls: &[String],
    folder: &str,
) -> ImageResult<Vec<UploadedImage>> {
    futures::future::try_join_all(data_urls.iter().map(|image| store.upload(image, folder))).await
}

/// Delete hosted images, logging failures instead of propagating them
pub async fn delete_quietly(store: &dyn ImageStore, urls: &[String]) {
    for url in urls {
        let Some(public_id) = store.public_id(url) else {
            continue;
        };
        match store.delete(&public_id).await {
            Ok(()) => tracing::info!(public_id = %public_id, "Image deleted"),
            Err(e) => tracing::warn!(public_id = %public_id, error = %e, "Failed to delete image"),
        }
    }
}

/// `data:image/<format>;base64,<payload>`
pub fn is_data_url(value: &str) -> bool {
    value.starts_with("data:image/") && value.contains("base64,")
}

/// Split a data URL into `(format, base64 payload)`
pub fn parse_data_url(value: &str) -> ImageResult<(String, &str)> {
    if !value.starts_with("data:image") {
        return Err(ImageError::InvalidFormat);
    }
    let (header, payload) = value.split_once(',').ok_or(ImageError::InvalidFormat)?;
    if !header.ends_with(";base64") {
        return Err(ImageError::InvalidFormat);
    }
    let format = header
        .trim_start_matches("data:image/")
        .trim_end_matches(";base64")
        .to_string();
    Ok((format, payload))
}

/// Derive a public id from a hosted URL
///
/// For Cloudinary delivery URLs this is the path after `/upload/` without
/// the version segment and extension (folders included). Otherwise the
/// last path segment without extension.
pub fn public_id_from_url(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let path = match url.split_once("/upload/") {
        Some((_, rest)) => strip_version(rest),
        None => url.rsplit('/').next()?,
    };
    let id = match path.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => path,
    };
    (!id.is_empty()).then(|| id.to_string())
}

fn strip_version(path: &str) -> &str {
    match path.split_once('/') {
        Some((first, rest))
            if first.len() > 1
                && first.starts_with('v')
                && first[1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            rest
        }
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_from_cloudinary_url() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1712345678/pajama-store/products/abc123.jpg";
        assert_eq!(
            public_id_from_url(url).as_deref(),
            Some("pajama-store/products/abc123")
        );
    }

    #[test]
    fn test_public_id_without_version() {
        let url = "https://res.cloudinary.com/demo/image/upload/sample.png";
        assert_eq!(public_id_from_url(url).as_deref(), Some("sample"));
    }

    #[test]
    fn test_public_id_from_plain_url() {
        assert_eq!(
            public_id_from_url("https://cdn.example.com/a/b/photo.webp").as_deref(),
            Some("photo")
        );
        assert_eq!(public_id_from_url(""), None);
    }

    #[test]
    fn test_data_url_detection() {
        assert!(is_data_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_data_url("https://res.cloudinary.com/x.png"));
        assert!(!is_data_url("data:text/plain;base64,aGVsbG8="));
    }

    #[test]
    fn test_parse_data_url() {
        let (format, payload) = parse_data_url("data:image/jpeg;base64,/9j/4AAQ").unwrap();
        assert_eq!(format, "jpeg");
        assert_eq!(payload, "/9j/4AAQ");
        assert!(matches!(
            parse_data_url("not-an-image"),
            Err(ImageError::InvalidFormat)
        ));
        assert!(matches!(
            parse_data_url("data:image/png,rawbytes"),
            Err(ImageError::InvalidFormat)
        ));
    }

    #[test]
    fn test_error_mapping() {
        let err: AppError = ImageError::InvalidFormat.into();
        assert_eq!(err.code, ErrorCode::InvalidImage);
        let err: AppError = ImageError::Upload("timeout".into()).into();
        assert_eq!(err.code, ErrorCode::ImageUploadFailed);
        assert!(err.message.starts_with("Failed to upload images"));
    }
}
