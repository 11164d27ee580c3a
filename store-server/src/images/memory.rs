//! In-memory image store
//!
//! Decodes and keeps uploads in a map. Used by the test suites and when no
//! Cloudinary credentials are configured (uploads are then lost on
//! restart, which the server logs at startup).

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{ImageError, ImageResult, ImageStore, UploadedImage, parse_data_url};

const URL_PREFIX: &str = "memory://images/";

#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: Mutex<HashMap<String, UploadedImage>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an image with this public id is currently stored
    pub fn contains(&self, public_id: &str) -> bool {
        self.images
            .lock()
            .map(|images| images.contains_key(public_id))
            .unwrap_or(false)
    }

    /// Number of stored images
    pub fn len(&self) -> usize {
        self.images.lock().map(|images| images.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_error() -> ImageError {
        ImageError::Service("image map poisoned".into())
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn upload(&self, data_url: &str, folder: &str) -> ImageResult<UploadedImage> {
        let (format, payload) = parse_data_url(data_url)?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| ImageError::InvalidFormat)?;

        let key = uuid::Uuid::new_v4().simple().to_string();
        let public_id = format!("{}/{}", folder.trim_matches('/'), key);
        let image = UploadedImage {
            url: format!("{URL_PREFIX}{public_id}.{format}"),
            public_id: public_id.clone(),
            format,
            bytes: bytes.len() as u64,
        };

        self.images
            .lock()
            .map_err(|_| Self::lock_error())?
            .insert(public_id, image.clone());
        Ok(image)
    }

    async fn delete(&self, public_id: &str) -> ImageResult<()> {
        self.images
            .lock()
            .map_err(|_| Self::lock_error())?
            .remove(public_id);
        Ok(())
    }

    fn is_hosted_url(&self, url: &str) -> bool {
        url.starts_with(URL_PREFIX)
    }

    fn public_id(&self, url: &str) -> Option<String> {
        let path = url.strip_prefix(URL_PREFIX)?;
        let id = path.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(path);
        Some(id.to_string())
    }
}
