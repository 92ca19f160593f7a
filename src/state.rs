//! Application state
//!
//! Holds all shared components and state

use crate::capture::{FileCaptureSource, LiveCaptureSource};
use crate::draft_store::DraftStore;
use crate::error::Result;
use crate::geolocate::GeoLocator;
use crate::image_gateway::{ImageHostClient, ImageHostConfig};
use crate::report_gateway::ReportStoreClient;
use crate::submission::SubmissionPipeline;
use crate::translations::Language;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Application configuration
///
/// Read from the environment once at startup and validated before the
/// service accepts work; never re-read mid-operation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Image host account identifier
    pub cloud_name: String,
    /// Image host unsigned upload preset
    pub upload_preset: String,
    /// Report document store base URL
    pub report_store_url: String,
    /// Report collection name
    pub report_collection: String,
    /// Location source endpoint (absent: captures carry no fix)
    pub location_source_url: Option<String>,
    /// Rear camera device path or stream URL
    pub camera_device: String,
    /// Directory for draft preview images
    pub preview_dir: PathBuf,
    /// Interface language for user-facing messages
    pub language: Language,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
            upload_preset: std::env::var("CLOUDINARY_UPLOAD_PRESET")
                .unwrap_or_else(|_| "safai_citizen".to_string()),
            report_store_url: std::env::var("REPORT_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:8090/api".to_string()),
            report_collection: std::env::var("REPORT_COLLECTION")
                .unwrap_or_else(|_| "civilian".to_string()),
            location_source_url: std::env::var("LOCATION_SOURCE_URL").ok(),
            camera_device: std::env::var("CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            preview_dir: std::env::var("PREVIEW_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/var/lib/safai/previews")),
            language: std::env::var("LANGUAGE")
                .map(|l| Language::from(l.as_str()))
                .unwrap_or_default(),
        }
    }
}

impl AppConfig {
    pub fn image_host(&self) -> ImageHostConfig {
        ImageHostConfig {
            cloud_name: self.cloud_name.clone(),
            upload_preset: self.upload_preset.clone(),
        }
    }

    /// Startup validation; a failure here blocks the service from starting
    pub fn validate(&self) -> Result<()> {
        self.image_host().validate()?;
        if self.report_store_url.is_empty() {
            return Err(crate::error::Error::Config(
                "report store URL not configured (set REPORT_STORE_URL)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Draft store (single logical capture/submit flow)
    pub drafts: Arc<RwLock<DraftStore>>,
    /// Live camera capture source
    pub live: Arc<Mutex<LiveCaptureSource>>,
    /// File-selection capture source
    pub files: Arc<Mutex<FileCaptureSource>>,
    /// GeoLocator
    pub locator: Arc<GeoLocator>,
    /// Submission pipeline over the concrete gateways
    pub pipeline: Arc<SubmissionPipeline<ImageHostClient, ReportStoreClient>>,
    /// Report store client (moderation pass-through)
    pub reports: ReportStoreClient,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cloud_name: "demo".to_string(),
            upload_preset: "safai_citizen".to_string(),
            report_store_url: "http://localhost:8090/api".to_string(),
            report_collection: "civilian".to_string(),
            location_source_url: None,
            camera_device: "/dev/video0".to_string(),
            preview_dir: PathBuf::from("/tmp/safai-previews"),
            language: Language::En,
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_cloud_name() {
        let mut cfg = config();
        cfg.cloud_name = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_store_url() {
        let mut cfg = config();
        cfg.report_store_url = String::new();
        assert!(cfg.validate().is_err());
    }
}
