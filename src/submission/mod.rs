//! Submission Pipeline - Sequential Draft Upload
//!
//! ## Responsibilities
//!
//! - Validate the submission before any network call
//! - Upload each pending draft to the image host, in store order
//! - Persist the corresponding report document
//! - Mark drafts uploaded as each record completes
//!
//! ## Failure policy
//!
//! Strictly sequential, abort on first failure: records uploaded earlier
//! in the batch keep their `Uploaded` state, records after the failure
//! stay `Pending`, and retry is manual (the next submit picks up exactly
//! the records that did not complete). A report-store failure does not
//! undo the image upload. No parallel fan-out.

use crate::draft_store::DraftStore;
use crate::error::{Error, Result};
use crate::image_gateway::{ImageHost, UploadContext};
use crate::report_gateway::{NewReport, ReportLocation, ReportStore};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Progress of the current (or last) submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmitPhase {
    Idle,
    Uploading { index: usize, total: usize },
    Done { submitted: usize },
    Failed { index: usize, submitted: usize },
}

/// Submission pipeline over the two gateways
pub struct SubmissionPipeline<H, S> {
    images: H,
    reports: S,
    phase: RwLock<SubmitPhase>,
}

impl<H: ImageHost + Sync, S: ReportStore + Sync> SubmissionPipeline<H, S> {
    pub fn new(images: H, reports: S) -> Self {
        Self {
            images,
            reports,
            phase: RwLock::new(SubmitPhase::Idle),
        }
    }

    pub async fn phase(&self) -> SubmitPhase {
        *self.phase.read().await
    }

    async fn set_phase(&self, phase: SubmitPhase) {
        *self.phase.write().await = phase;
    }

    /// Submit every pending draft, in store order.
    ///
    /// Returns the number of records fully processed. An empty submitter
    /// name fails validation before any gateway is touched; zero pending
    /// drafts is a no-op, not an error.
    pub async fn submit(
        &self,
        store: &mut DraftStore,
        submitter_name: &str,
        description: &str,
    ) -> Result<usize> {
        let submitter = submitter_name.trim();
        if submitter.is_empty() {
            return Err(Error::Validation("submitter name is required".to_string()));
        }

        let ids: Vec<Uuid> = store.pending().map(|r| r.id).collect();
        if ids.is_empty() {
            tracing::debug!("No pending drafts, submit is a no-op");
            return Ok(0);
        }

        let total = ids.len();
        let description = description.trim();
        let mut submitted = 0;

        for (index, id) in ids.into_iter().enumerate() {
            self.set_phase(SubmitPhase::Uploading { index, total }).await;

            if let Err(e) = self.submit_one(store, id, submitter, description).await {
                self.set_phase(SubmitPhase::Failed { index, submitted }).await;
                tracing::error!(
                    draft_id = %id,
                    submitted,
                    remaining = total - index,
                    error = %e,
                    "Submission aborted"
                );
                return Err(e);
            }
            submitted += 1;
        }

        self.set_phase(SubmitPhase::Done { submitted }).await;
        tracing::info!(submitted, "Submission complete");
        Ok(submitted)
    }

    async fn submit_one(
        &self,
        store: &mut DraftStore,
        id: Uuid,
        submitter: &str,
        description: &str,
    ) -> Result<()> {
        let record = store
            .get(id)
            .ok_or_else(|| Error::Internal(format!("draft {} disappeared mid-submit", id)))?;

        let context = UploadContext::new(record.captured_at, record.location);
        let location = record.location;

        let url = self
            .images
            .upload(&record.image_data, &context)
            .await
            .map_err(|e| Error::Upload {
                draft_id: id,
                message: e.to_string(),
            })?;

        let report = NewReport {
            image_url: url.clone(),
            submitter_name: submitter.to_string(),
            // Missing coordinates are written as 0.0; consumers of the
            // collection treat the field as required.
            location: ReportLocation {
                latitude: location.map_or(0.0, |l| l.latitude),
                longitude: location.map_or(0.0, |l| l.longitude),
                accuracy: location.map(|l| l.accuracy),
            },
            description: description.to_string(),
        };

        // The image stays on the host if this fails; there is no
        // compensation step.
        self.reports
            .create(report)
            .await
            .map_err(|e| Error::Persistence(format!("report for draft {}: {}", id, e)))?;

        store.mark_uploaded(id, url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureRecord, PreviewHandle, UploadState};
    use crate::geolocate::LocationFix;
    use std::sync::Mutex;

    struct MockHost {
        fail_at: Option<usize>,
        calls: Mutex<usize>,
    }

    impl MockHost {
        fn new() -> Self {
            Self {
                fail_at: None,
                calls: Mutex::new(0),
            }
        }

        fn failing_at(call: usize) -> Self {
            Self {
                fail_at: Some(call),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl ImageHost for MockHost {
        async fn upload(&self, _image: &[u8], _context: &UploadContext) -> Result<String> {
            let n = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if self.fail_at == Some(n) {
                return Err(Error::Internal("image host down".to_string()));
            }
            Ok(format!("https://img.example/{}.jpg", n))
        }
    }

    #[derive(Default)]
    struct MockStore {
        fail: bool,
        created: Mutex<Vec<NewReport>>,
    }

    impl MockStore {
        fn created(&self) -> Vec<NewReport> {
            self.created.lock().unwrap().clone()
        }
    }

    impl ReportStore for MockStore {
        async fn create(&self, report: NewReport) -> Result<String> {
            if self.fail {
                return Err(Error::Persistence("store down".to_string()));
            }
            let mut created = self.created.lock().unwrap();
            created.push(report);
            Ok(format!("doc-{}", created.len()))
        }
    }

    fn record(location: Option<LocationFix>) -> CaptureRecord {
        let path = std::env::temp_dir().join(format!("safai-submit-{}.jpg", Uuid::new_v4()));
        CaptureRecord::new(vec![0xff, 0xd8, 0x01], PreviewHandle::new(path), location)
    }

    fn fix(lat: f64, lon: f64) -> LocationFix {
        LocationFix {
            latitude: lat,
            longitude: lon,
            accuracy: 10.0,
        }
    }

    #[tokio::test]
    async fn test_empty_name_never_touches_the_gateways() {
        let pipeline = SubmissionPipeline::new(MockHost::new(), MockStore::default());
        let mut store = DraftStore::new();
        store.add(vec![record(None)]);

        let err = pipeline.submit(&mut store, "   ", "desc").await;
        assert!(matches!(err, Err(Error::Validation(_))));
        assert_eq!(pipeline.images.call_count(), 0);
        assert!(pipeline.reports.created().is_empty());
        assert_eq!(pipeline.phase().await, SubmitPhase::Idle);
    }

    #[tokio::test]
    async fn test_no_pending_drafts_is_a_noop() {
        let pipeline = SubmissionPipeline::new(MockHost::new(), MockStore::default());
        let mut store = DraftStore::new();

        let submitted = pipeline.submit(&mut store, "Asha", "").await.unwrap();
        assert_eq!(submitted, 0);
        assert_eq!(pipeline.images.call_count(), 0);
    }

    #[tokio::test]
    async fn test_full_batch_success() {
        let pipeline = SubmissionPipeline::new(MockHost::new(), MockStore::default());
        let mut store = DraftStore::new();
        store.add(vec![
            record(Some(fix(12.97, 77.59))),
            record(Some(fix(12.98, 77.60))),
            record(Some(fix(12.99, 77.61))),
        ]);

        let submitted = pipeline
            .submit(&mut store, "Asha", " overflowing bin ")
            .await
            .unwrap();
        assert_eq!(submitted, 3);
        assert_eq!(pipeline.phase().await, SubmitPhase::Done { submitted: 3 });

        // every draft transitioned and carries its durable URL
        for rec in store.records() {
            assert_eq!(rec.upload_state, UploadState::Uploaded);
            assert!(rec.remote_url.as_deref().unwrap().starts_with("https://"));
        }

        // the store received one create per draft, coordinates intact
        let created = pipeline.reports.created();
        assert_eq!(created.len(), 3);
        let lats: Vec<f64> = created.iter().map(|r| r.location.latitude).collect();
        assert_eq!(lats, vec![12.97, 12.98, 12.99]);
        assert!(created.iter().all(|r| r.submitter_name == "Asha"));
        assert!(created.iter().all(|r| r.description == "overflowing bin"));
    }

    #[tokio::test]
    async fn test_failure_mid_batch_keeps_prior_successes() {
        // second of three uploads fails
        let pipeline = SubmissionPipeline::new(MockHost::failing_at(2), MockStore::default());
        let mut store = DraftStore::new();
        store.add(vec![record(None), record(None), record(None)]);
        let ids: Vec<Uuid> = store.records().iter().map(|r| r.id).collect();

        let err = pipeline.submit(&mut store, "Asha", "").await;
        match err {
            Err(Error::Upload { draft_id, .. }) => assert_eq!(draft_id, ids[1]),
            other => panic!("expected Upload failure, got {:?}", other.map(|_| ())),
        }

        assert_eq!(
            pipeline.phase().await,
            SubmitPhase::Failed {
                index: 1,
                submitted: 1
            }
        );
        assert_eq!(store.get(ids[0]).unwrap().upload_state, UploadState::Uploaded);
        assert_eq!(store.get(ids[1]).unwrap().upload_state, UploadState::Pending);
        assert_eq!(store.get(ids[2]).unwrap().upload_state, UploadState::Pending);
        assert_eq!(pipeline.reports.created().len(), 1);
    }

    #[tokio::test]
    async fn test_manual_retry_excludes_uploaded_records() {
        let mut store = DraftStore::new();
        store.add(vec![record(None), record(None), record(None)]);

        let failing = SubmissionPipeline::new(MockHost::failing_at(2), MockStore::default());
        assert!(failing.submit(&mut store, "Asha", "").await.is_err());
        assert_eq!(store.pending().count(), 2);

        // user presses submit again; only the unfinished records go out
        let retry = SubmissionPipeline::new(MockHost::new(), MockStore::default());
        let submitted = retry.submit(&mut store, "Asha", "").await.unwrap();
        assert_eq!(submitted, 2);
        assert_eq!(retry.images.call_count(), 2);
        assert_eq!(store.pending().count(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_aborts_without_marking() {
        let pipeline = SubmissionPipeline::new(
            MockHost::new(),
            MockStore {
                fail: true,
                ..Default::default()
            },
        );
        let mut store = DraftStore::new();
        store.add(vec![record(None)]);
        let id = store.records()[0].id;

        let err = pipeline.submit(&mut store, "Asha", "").await;
        assert!(matches!(err, Err(Error::Persistence(_))));

        // the upload happened and is not undone, but the draft stays
        // pending so the next submit retries it
        assert_eq!(pipeline.images.call_count(), 1);
        assert_eq!(store.get(id).unwrap().upload_state, UploadState::Pending);
    }

    #[tokio::test]
    async fn test_missing_coordinates_default_to_zero() {
        let pipeline = SubmissionPipeline::new(MockHost::new(), MockStore::default());
        let mut store = DraftStore::new();
        store.add(vec![record(None), record(None)]);

        let submitted = pipeline.submit(&mut store, "Asha", "").await.unwrap();
        assert_eq!(submitted, 2);

        for created in pipeline.reports.created() {
            assert_eq!(created.location.latitude, 0.0);
            assert_eq!(created.location.longitude, 0.0);
            assert!(created.location.accuracy.is_none());
        }
    }
}
