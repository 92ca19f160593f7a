//! File-selection capture mode - admits batches of pre-existing images

use crate::capture::{store_preview, CaptureRecord, CaptureSource};
use crate::error::Result;
use crate::geolocate::GeoLocator;
use std::path::PathBuf;
use std::sync::Arc;

/// File-selection capture source
///
/// Holds the batch of selected image paths until [`CaptureSource::produce`]
/// admits them. One fresh geolocation attempt is made per batch, not per
/// file; when it fails the files are still admitted with `location = None`.
pub struct FileCaptureSource {
    preview_dir: PathBuf,
    locator: Arc<GeoLocator>,
    selected: Vec<PathBuf>,
}

impl FileCaptureSource {
    pub fn new(preview_dir: PathBuf, locator: Arc<GeoLocator>) -> Self {
        Self {
            preview_dir,
            locator,
            selected: Vec::new(),
        }
    }

    /// Queue a batch of image files for the next `produce` call
    pub fn select(&mut self, paths: Vec<PathBuf>) {
        self.selected.extend(paths);
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }
}

impl CaptureSource for FileCaptureSource {
    async fn produce(&mut self) -> Result<Vec<CaptureRecord>> {
        if self.selected.is_empty() {
            return Ok(Vec::new());
        }

        let paths = std::mem::take(&mut self.selected);

        let location = match self.locator.resolve().await {
            Ok(fix) => Some(fix),
            Err(e) => {
                tracing::warn!(error = %e, "Location unavailable, admitting files without a fix");
                None
            }
        };

        // Read every file before creating records, so a bad path fails the
        // batch without leaving orphaned preview files behind.
        let mut payloads = Vec::with_capacity(paths.len());
        for path in &paths {
            let data = tokio::fs::read(path).await?;
            payloads.push(data);
        }

        let mut records = Vec::with_capacity(payloads.len());
        for (path, data) in paths.iter().zip(payloads) {
            let preview = store_preview(&self.preview_dir, &data).await?;
            let record = CaptureRecord::new(data, preview, location);
            tracing::debug!(
                draft_id = %record.id,
                path = %path.display(),
                has_location = record.location.is_some(),
                "File admitted"
            );
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocate::LocationFix;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("safai-files-{}-{}", tag, uuid::Uuid::new_v4()))
    }

    async fn write_image(dir: &PathBuf, name: &str) -> PathBuf {
        tokio::fs::create_dir_all(dir).await.unwrap();
        let path = dir.join(name);
        tokio::fs::write(&path, b"\xff\xd8fakejpeg").await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_empty_selection_produces_nothing() {
        let mut source = FileCaptureSource::new(temp_dir("empty"), Arc::new(GeoLocator::new(None)));
        assert!(source.produce().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_files_admitted_without_fix_on_denied_location() {
        let dir = temp_dir("denied");
        let a = write_image(&dir, "a.jpg").await;
        let b = write_image(&dir, "b.jpg").await;

        let mut source =
            FileCaptureSource::new(dir.join("previews"), Arc::new(GeoLocator::new(None)));
        source.select(vec![a, b]);

        let mut records = source.produce().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.location.is_none()));
        assert!(records.iter().all(|r| r.is_pending()));
        assert_eq!(source.selected_count(), 0);

        for record in &mut records {
            record.preview.release().unwrap();
        }
    }

    #[tokio::test]
    async fn test_batch_shares_one_fix() {
        let dir = temp_dir("fix");
        let a = write_image(&dir, "a.jpg").await;
        let b = write_image(&dir, "b.jpg").await;

        let locator = Arc::new(GeoLocator::new(None));
        locator
            .seed(LocationFix {
                latitude: 12.97,
                longitude: 77.59,
                accuracy: 12.0,
            })
            .await;

        let mut source = FileCaptureSource::new(dir.join("previews"), locator);
        source.select(vec![a, b]);

        let mut records = source.produce().await.unwrap();
        assert_eq!(records.len(), 2);
        for record in &records {
            let fix = record.location.expect("batch fix");
            assert_eq!(fix.latitude, 12.97);
        }

        for record in &mut records {
            record.preview.release().unwrap();
        }
    }

    #[tokio::test]
    async fn test_unreadable_path_fails_the_batch() {
        let dir = temp_dir("missing");
        let mut source =
            FileCaptureSource::new(dir.join("previews"), Arc::new(GeoLocator::new(None)));
        source.select(vec![dir.join("nope.jpg")]);
        assert!(source.produce().await.is_err());
    }
}
