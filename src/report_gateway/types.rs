//! Report document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation status of a persisted report.
///
/// Written as `pending` at creation; the other states belong to external
/// moderation workflows and are only passed through by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
}

impl Default for ReportStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl From<&str> for ReportStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "in_progress" => Self::InProgress,
            "resolved" => Self::Resolved,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        };
        write!(f, "{}", s)
    }
}

/// Coordinates persisted with a report. Missing capture coordinates are
/// written as 0.0; the accuracy field is dropped when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Persisted report document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub image_url: String,
    pub submitter_name: String,
    pub location: ReportLocation,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
}

/// Create request: everything but the id, timestamp, and status,
/// which are stamped at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub image_url: String,
    pub submitter_name: String,
    pub location: ReportLocation,
    pub description: String,
}

/// Partial update for moderation pass-through
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ReportLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ReportStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(ReportStatus::from("resolved"), ReportStatus::Resolved);
        assert_eq!(ReportStatus::from("unknown"), ReportStatus::Pending);
        assert_eq!(ReportStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ReportSubmission {
            id: None,
            image_url: "https://img.example/a.jpg".to_string(),
            submitter_name: "Asha".to_string(),
            location: ReportLocation {
                latitude: 12.97,
                longitude: 77.59,
                accuracy: None,
            },
            description: "overflowing bin".to_string(),
            created_at: Utc::now(),
            status: ReportStatus::Pending,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"submitterName\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"status\":\"pending\""));
        assert!(!json.contains("accuracy"));
    }
}
