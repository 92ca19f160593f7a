//! Report Persistence Gateway - Document Store Client
//!
//! ## Responsibilities
//!
//! - Create report documents (stamped `createdAt`, `status = pending`)
//! - List, update, and delete reports for moderation tooling
//! - Map transport failures into `PersistenceError`
//!
//! The document store is an external collaborator reached over HTTP; the
//! service owns no storage of its own. Reports are never mutated by the
//! submission pipeline after creation.

mod client;
mod types;

pub use client::{ReportStore, ReportStoreClient};
pub use types::{NewReport, ReportLocation, ReportStatus, ReportSubmission, UpdateReport};
