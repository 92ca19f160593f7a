//! Image Hosting Gateway - Cloud Image Upload Client
//!
//! ## Responsibilities
//!
//! - Unsigned multipart upload of JPEG payloads to the cloud image host
//! - Capture context (timestamp, optional fix) attached as JSON metadata
//! - Startup validation of the two-value host configuration
//!
//! The gateway is consumed, not owned: it returns the durable secure URL
//! and maps every transport or remote rejection into a crate error for the
//! submission pipeline to classify.

use crate::error::{Error, Result};
use crate::geolocate::LocationFix;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Placeholder value shipped in the sample .env; treated as unconfigured
const PLACEHOLDER_CLOUD_NAME: &str = "your_cloudinary_cloud_name";

/// Image host configuration: two external string values, validated once
/// at startup and never read ad hoc mid-operation.
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    /// Cloud host identifier (account name in the upload URL)
    pub cloud_name: String,
    /// Unsigned upload preset name
    pub upload_preset: String,
}

impl ImageHostConfig {
    /// Startup validation. Missing values are an operator error surfaced
    /// as a blocking alert before the service accepts work.
    pub fn validate(&self) -> Result<()> {
        if self.cloud_name.is_empty() || self.cloud_name == PLACEHOLDER_CLOUD_NAME {
            return Err(Error::Config(
                "image host cloud name not configured (set CLOUDINARY_CLOUD_NAME)".to_string(),
            ));
        }
        if self.upload_preset.is_empty() {
            return Err(Error::Config(
                "image host upload preset not configured (set CLOUDINARY_UPLOAD_PRESET)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Free-form context attached to each upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadContext {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl UploadContext {
    pub fn new(captured_at: DateTime<Utc>, location: Option<LocationFix>) -> Self {
        Self {
            timestamp: captured_at,
            latitude: location.map(|l| l.latitude),
            longitude: location.map(|l| l.longitude),
            accuracy: location.map(|l| l.accuracy),
        }
    }
}

/// Upload result from the image host
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Contract the submission pipeline consumes
pub trait ImageHost {
    /// Upload one image with its context, returning the durable URL
    fn upload(
        &self,
        image: &[u8],
        context: &UploadContext,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// HTTP client for the cloud image host
#[derive(Clone)]
pub struct ImageHostClient {
    http: reqwest::Client,
    config: ImageHostConfig,
}

impl ImageHostClient {
    pub fn new(config: ImageHostConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { http, config }
    }

    fn upload_url(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.config.cloud_name
        )
    }
}

impl ImageHost for ImageHostClient {
    async fn upload(&self, image: &[u8], context: &UploadContext) -> Result<String> {
        let context_json = serde_json::to_string(context)?;

        let part = Part::bytes(image.to_vec())
            .file_name("capture.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| Error::Internal(format!("invalid upload part: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("context", context_json);

        tracing::debug!(
            cloud_name = %self.config.cloud_name,
            preset = %self.config.upload_preset,
            size = image.len(),
            "Uploading image"
        );

        let resp = self.http.post(self.upload_url()).multipart(form).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();

            // A 400 naming the preset is a configuration problem on the
            // host dashboard, not a transient upload failure.
            if status == reqwest::StatusCode::BAD_REQUEST
                && body.contains("Upload preset not found")
            {
                return Err(Error::Config(format!(
                    "upload preset \"{}\" not found on the image host",
                    self.config.upload_preset
                )));
            }

            return Err(Error::Internal(format!(
                "image host returned {}: {}",
                status,
                body.trim()
            )));
        }

        let uploaded: UploadResponse = resp
            .json()
            .await
            .map_err(|e| Error::Internal(format!("image host response parse error: {}", e)))?;

        tracing::info!(url = %uploaded.secure_url, "Image uploaded");
        Ok(uploaded.secure_url)
    }
}
