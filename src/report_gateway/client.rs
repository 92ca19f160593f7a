//! Document store HTTP client

use crate::error::{Error, Result};
use crate::report_gateway::types::{NewReport, ReportStatus, ReportSubmission, UpdateReport};
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

/// Create response from the document store
#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

/// Contract the submission pipeline consumes
pub trait ReportStore {
    /// Persist a new report, returning its document id
    fn create(
        &self,
        report: NewReport,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// HTTP client for the report document store
#[derive(Clone)]
pub struct ReportStoreClient {
    http: reqwest::Client,
    base_url: String,
    collection: String,
}

impl ReportStoreClient {
    pub fn new(base_url: String, collection: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            collection,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.collection, id)
    }

    /// All reports, newest first
    pub async fn list(&self) -> Result<Vec<ReportSubmission>> {
        let resp = self
            .http
            .get(self.collection_url())
            .query(&[("orderBy", "createdAt"), ("order", "desc")])
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("list failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::Persistence(format!(
                "list returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::Persistence(format!("list parse error: {}", e)))
    }

    /// Reports with the given moderation status.
    ///
    /// The store is queried for the full ordered list and filtered here;
    /// the collection API has no status index.
    pub async fn list_by_status(&self, status: ReportStatus) -> Result<Vec<ReportSubmission>> {
        let reports = self.list().await?;
        Ok(reports.into_iter().filter(|r| r.status == status).collect())
    }

    /// Moderation pass-through update
    pub async fn update(&self, id: &str, update: UpdateReport) -> Result<()> {
        let resp = self
            .http
            .patch(self.document_url(id))
            .json(&update)
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("update failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => {
                tracing::debug!(report_id = %id, "Report updated");
                Ok(())
            }
            reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound(format!("report {}", id))),
            s => Err(Error::Persistence(format!("update returned {}", s))),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.document_url(id))
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("delete failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => {
                tracing::debug!(report_id = %id, "Report deleted");
                Ok(())
            }
            reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound(format!("report {}", id))),
            s => Err(Error::Persistence(format!("delete returned {}", s))),
        }
    }
}

impl ReportStore for ReportStoreClient {
    async fn create(&self, report: NewReport) -> Result<String> {
        // Status and timestamp are stamped at write time; moderation
        // workflows own every later mutation.
        let document = ReportSubmission {
            id: None,
            image_url: report.image_url,
            submitter_name: report.submitter_name,
            location: report.location,
            description: report.description,
            created_at: Utc::now(),
            status: ReportStatus::Pending,
        };

        let resp = self
            .http
            .post(self.collection_url())
            .json(&document)
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("create failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::Persistence(format!(
                "create returned {}",
                resp.status()
            )));
        }

        let created: CreatedResponse = resp
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("create parse error: {}", e)))?;

        tracing::info!(report_id = %created.id, "Report persisted");
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_rooted_at_the_collection() {
        let client = ReportStoreClient::new(
            "https://reports.example/api/".to_string(),
            "civilian".to_string(),
        );
        assert_eq!(client.collection_url(), "https://reports.example/api/civilian");
        assert_eq!(
            client.document_url("abc123"),
            "https://reports.example/api/civilian/abc123"
        );
    }
}
