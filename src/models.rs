//! Shared models and types
//!
//! This module contains types shared across multiple modules
//! to avoid circular dependencies.

use crate::capture::{CaptureRecord, UploadState};
use crate::geolocate::LocationFix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub drafts: usize,
    pub pending: usize,
}

/// Wire form of a draft for the capture UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub id: Uuid,
    pub captured_at: DateTime<Utc>,
    pub upload_state: UploadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationFix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub preview_path: String,
}

impl From<&CaptureRecord> for DraftSummary {
    fn from(record: &CaptureRecord) -> Self {
        Self {
            id: record.id,
            captured_at: record.captured_at,
            upload_state: record.upload_state,
            location: record.location,
            remote_url: record.remote_url.clone(),
            preview_path: record.preview.path().display().to_string(),
        }
    }
}
