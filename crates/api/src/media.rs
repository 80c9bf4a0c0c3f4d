//! Image hosting for post uploads.
//!
//! Handlers see only the [`ImageHost`] trait. [`CloudinaryImageHost`] is the
//! production implementation: a signed upload over multipart HTTP, one
//! attempt, no retries.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use snapfeed_core::error::CoreError;

use crate::config::{optional, Lookup};

/// HTTP timeout for a single upload.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The host answered with a non-2xx status code.
    #[error("Image host returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Somewhere to put post images.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Store `bytes` under `folder` and return a public HTTPS URL.
    async fn upload(&self, folder: &str, bytes: Vec<u8>, mime: &str)
        -> Result<String, ImageHostError>;
}

// ---------------------------------------------------------------------------
// Cloudinary
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl CloudinaryConfig {
    /// Load image host credentials.
    ///
    /// | Env Var                 |
    /// |-------------------------|
    /// | `CLOUDINARY_CLOUD_NAME` |
    /// | `CLOUDINARY_API_KEY`    |
    /// | `CLOUDINARY_API_SECRET` |
    ///
    /// All three or none. `None` leaves image uploads disabled.
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Option<Self>, CoreError> {
        let cloud_name = optional(lookup, "CLOUDINARY_CLOUD_NAME");
        let api_key = optional(lookup, "CLOUDINARY_API_KEY");
        let api_secret = optional(lookup, "CLOUDINARY_API_SECRET");

        match (cloud_name, api_key, api_secret) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Ok(Some(Self {
                cloud_name,
                api_key,
                api_secret,
            })),
            (None, None, None) => Ok(None),
            _ => Err(CoreError::Config(
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"
                    .into(),
            )),
        }
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

pub struct CloudinaryImageHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryImageHost {
    pub fn new(config: CloudinaryConfig) -> Result<Self, ImageHostError> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(
        &self,
        folder: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> Result<String, ImageHostError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", &timestamp)],
            &self.config.api_secret,
        );

        let file = reqwest::multipart::Part::bytes(bytes)
            .file_name("upload")
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(status, folder, "Image upload rejected");
            return Err(ImageHostError::HttpStatus(status));
        }

        let body: UploadResponse = response.json().await?;
        tracing::debug!(folder, url = %body.secure_url, "Image uploaded");
        Ok(body.secure_url)
    }
}

/// Cloudinary request signature: the params sorted by name, joined as
/// `k=v&k=v`, with the API secret appended, SHA-256 hex encoded.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}
