//! DraftStore - In-Memory Draft Collection
//!
//! ## Responsibilities
//!
//! - Hold captured-but-not-yet-submitted records in insertion order
//! - Release preview handles exactly once when records are discarded
//! - Enforce the monotonic Pending -> Uploaded transition
//!
//! The store is mutated only by the single logical capture/submit flow;
//! callers that share it across handlers wrap it in a lock.

use crate::capture::{CaptureRecord, UploadState};
use crate::error::{Error, Result};
use uuid::Uuid;

/// In-memory ordered collection of drafts, keyed by record id
#[derive(Default)]
pub struct DraftStore {
    records: Vec<CaptureRecord>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records, preserving input order. A duplicate id is refused
    /// and logged; the rest of the batch is still admitted.
    pub fn add(&mut self, records: Vec<CaptureRecord>) {
        for mut record in records {
            if self.records.iter().any(|r| r.id == record.id) {
                tracing::warn!(draft_id = %record.id, "Duplicate draft id refused");
                if let Err(e) = record.preview.release() {
                    tracing::warn!(error = %e, "Failed to release refused preview");
                }
                continue;
            }
            self.records.push(record);
        }
    }

    /// Release the record's preview and delete it. Unknown ids are a no-op,
    /// so a second remove never double-releases.
    pub fn remove(&mut self, id: Uuid) {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return;
        };

        let mut record = self.records.remove(index);
        if let Err(e) = record.preview.release() {
            tracing::warn!(draft_id = %id, error = %e, "Preview release failed on remove");
        }
        tracing::debug!(draft_id = %id, "Draft removed");
    }

    /// Transition a draft to `Uploaded` and attach its remote URL.
    ///
    /// The transition is one-directional: marking an already-uploaded
    /// draft (or an unknown id) fails with `InvalidTransition` and leaves
    /// the stored `remote_url` untouched.
    pub fn mark_uploaded(&mut self, id: Uuid, remote_url: String) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::InvalidTransition(format!("unknown draft {}", id)))?;

        if record.upload_state == UploadState::Uploaded {
            return Err(Error::InvalidTransition(format!(
                "draft {} already uploaded",
                id
            )));
        }

        record.upload_state = UploadState::Uploaded;
        record.remote_url = Some(remote_url);
        Ok(())
    }

    /// Pending records in insertion order. The iterator is lazy and a new
    /// call restarts from the head.
    pub fn pending(&self) -> impl Iterator<Item = &CaptureRecord> {
        self.records.iter().filter(|r| r.is_pending())
    }

    pub fn get(&self, id: Uuid) -> Option<&CaptureRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[CaptureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Discard every draft, releasing each preview (component teardown)
    pub fn clear(&mut self) {
        for mut record in self.records.drain(..) {
            if let Err(e) = record.preview.release() {
                tracing::warn!(draft_id = %record.id, error = %e, "Preview release failed on clear");
            }
        }
    }
}

impl Drop for DraftStore {
    fn drop(&mut self) {
        self.clear();
    }
}
