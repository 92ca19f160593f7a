//! Capture Sources - Producers of Draft Photo Records
//!
//! ## Responsibilities
//!
//! - Live mode: sample stills from an exclusive camera stream (ffmpeg)
//! - File mode: admit batches of pre-existing image files
//! - Attach the current geolocation fix at capture time
//! - Write the local preview image for each record
//!
//! Both modes yield the same [`CaptureRecord`] shape with
//! `upload_state = Pending`, so the draft store and the submission
//! pipeline never care which mode produced a record.

mod files;
mod live;
mod types;

pub use files::FileCaptureSource;
pub use live::LiveCaptureSource;
pub use types::{CaptureRecord, PreviewHandle, UploadState};

use crate::error::Result;
use std::path::Path;

/// Common contract of the two capture modes
pub trait CaptureSource {
    /// Produce zero or more pending records
    fn produce(&mut self) -> impl std::future::Future<Output = Result<Vec<CaptureRecord>>> + Send;
}

/// Write the preview image for a new record and hand back its owned handle
pub(crate) async fn store_preview(preview_dir: &Path, data: &[u8]) -> Result<PreviewHandle> {
    tokio::fs::create_dir_all(preview_dir).await?;

    let path = preview_dir.join(format!("{}.jpg", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, data).await?;

    tracing::debug!(
        path = %path.display(),
        size = data.len(),
        "Saved preview"
    );

    Ok(PreviewHandle::new(path))
}
