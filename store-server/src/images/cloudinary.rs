//! Cloudinary client
//!
//! Signed upload/destroy calls against the Cloudinary REST API. The
//! signature is SHA-256 over the sorted `key=value` parameter string
//! followed by the API secret, sent with `signature_algorithm=sha256`.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{ImageError, ImageResult, ImageStore, UploadedImage, parse_data_url};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";
const HOSTED_DOMAIN: &str = "cloudinary.com";

/// Cloudinary credentials
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinaryConfig {
    /// Read `CLOUDINARY_*` variables; `None` unless all three are set
    pub fn from_env() -> Option<Self> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            cloud_name: read("CLOUDINARY_CLOUD_NAME")?,
            api_key: read("CLOUDINARY_API_KEY")?,
            api_secret: read("CLOUDINARY_API_SECRET")?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    format: String,
    #[serde(default)]
    bytes: u64,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Cloudinary-backed [`ImageStore`]
#[derive(Debug, Clone)]
pub struct CloudinaryImageStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
    api_base: String,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self::with_api_base(config, DEFAULT_API_BASE)
    }

    /// Point the client at another API host
    pub fn with_api_base(config: CloudinaryConfig, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            api_base: api_base.into(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    /// Signature over the signed parameters
    fn sign(&self, params: &[(&str, String)]) -> String {
        sign_params(params, &self.config.api_secret)
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => format!("{} ({})", body.error.message, status),
            Err(_) => format!("HTTP {status}"),
        }
    }
}

/// `sha256("a=1&b=2" + secret)` with parameters sorted by name
pub(crate) fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, data_url: &str, folder: &str) -> ImageResult<UploadedImage> {
        parse_data_url(data_url)?;

        let signed = [("folder", folder.to_string()), ("timestamp", timestamp())];
        let signature = self.sign(&signed);

        let mut form = reqwest::multipart::Form::new()
            .text("file", data_url.to_string())
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in signed {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::Upload(Self::error_message(response).await));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Upload(format!("Failed to parse response: {e}")))?;

        tracing::info!(public_id = %body.public_id, bytes = body.bytes, "Image uploaded");
        Ok(UploadedImage {
            url: body.secure_url,
            public_id: body.public_id,
            format: body.format,
            bytes: body.bytes,
        })
    }

    async fn delete(&self, public_id: &str) -> ImageResult<()> {
        if public_id.is_empty() {
            return Err(ImageError::Delete("Public ID is required".into()));
        }

        let signed = [("public_id", public_id.to_string()), ("timestamp", timestamp())];
        let signature = self.sign(&signed);

        let mut form = reqwest::multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in signed {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ImageError::Delete(Self::error_message(response).await));
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(ImageError::Delete(format!("unexpected result '{other}'"))),
        }
    }

    fn is_hosted_url(&self, url: &str) -> bool {
        url.contains(HOSTED_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CloudinaryImageStore {
        CloudinaryImageStore::new(CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
        })
    }

    #[test]
    fn test_signature_sorts_parameters() {
        let a = sign_params(
            &[("timestamp", "1".into()), ("folder", "x".into())],
            "secret",
        );
        let b = sign_params(
            &[("folder", "x".into()), ("timestamp", "1".into())],
            "secret",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_matches_manual_digest() {
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"folder=x&timestamp=1secret");
            hex::encode(hasher.finalize())
        };
        let actual = sign_params(
            &[("timestamp", "1".into()), ("folder", "x".into())],
            "secret",
        );
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_endpoint_and_hosting() {
        let store = store();
        assert_eq!(
            store.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert!(store.is_hosted_url("https://res.cloudinary.com/demo/image/upload/a.jpg"));
        assert!(!store.is_hosted_url("https://example.com/a.jpg"));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_data_url() {
        let err = store()
            .upload("https://example.com/a.jpg", "pajama-store/products")
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::InvalidFormat));
    }
}
