//! Capture data types

use crate::error::{Error, Result};
use crate::geolocate::LocationFix;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Upload state of a draft. The transition is monotonic: once a record
/// is `Uploaded` it never reverts to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Pending,
    Uploaded,
}

impl UploadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadState::Pending => "pending",
            UploadState::Uploaded => "uploaded",
        }
    }
}

/// Owned reference to the local preview image of a draft.
///
/// The preview file is not garbage collected: every path that discards a
/// record must call [`PreviewHandle::release`] exactly once. A second
/// release is a checked error, and dropping an unreleased handle logs a
/// warning so leaks show up during testing.
#[derive(Debug)]
pub struct PreviewHandle {
    path: PathBuf,
    released: bool,
}

impl PreviewHandle {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    /// Local path of the preview image
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Delete the preview file. Exactly one release per handle.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Err(Error::Internal(format!(
                "preview {} released twice",
                self.path.display()
            )));
        }
        self.released = true;

        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        tracing::debug!(path = %self.path.display(), "Released preview");
        Ok(())
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                path = %self.path.display(),
                "Preview handle dropped without release"
            );
        }
    }
}

/// A captured-but-not-yet-submitted photo record
#[derive(Debug)]
pub struct CaptureRecord {
    /// Stable unique identifier, assigned at creation
    pub id: Uuid,
    /// Raw JPEG payload, owned by the record until upload completes
    pub image_data: Vec<u8>,
    /// Local preview image, explicitly released on discard
    pub preview: PreviewHandle,
    /// Fix attached at capture time; absence is a valid state
    pub location: Option<LocationFix>,
    pub captured_at: DateTime<Utc>,
    pub upload_state: UploadState,
    /// Set if and only if `upload_state == Uploaded`
    pub remote_url: Option<String>,
}

impl CaptureRecord {
    pub fn new(
        image_data: Vec<u8>,
        preview: PreviewHandle,
        location: Option<LocationFix>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_data,
            preview,
            location,
            captured_at: Utc::now(),
            upload_state: UploadState::Pending,
            remote_url: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.upload_state == UploadState::Pending
    }
}
