//! API Routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

use crate::capture::CaptureSource;
use crate::models::{ApiResponse, DraftSummary};
use crate::report_gateway::{ReportStatus, UpdateReport};
use crate::state::AppState;
use crate::translations::lookup;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Live capture session
        .route("/api/capture/start", post(start_capture))
        .route("/api/capture/stop", post(stop_capture))
        .route("/api/capture/frame", post(capture_frame))
        .route("/api/capture/status", get(capture_status))
        // Drafts
        .route("/api/drafts", get(list_drafts))
        .route("/api/drafts/files", post(select_files))
        .route("/api/drafts/:id", delete(remove_draft))
        // Submission
        .route("/api/submit", post(submit))
        .route("/api/submit/status", get(submit_status))
        // Reports (moderation pass-through)
        .route("/api/reports", get(list_reports))
        .route("/api/reports/:id", put(update_report))
        .route("/api/reports/:id", delete(delete_report))
        .with_state(state)
}

// ========================================
// Capture Handlers
// ========================================

async fn start_capture(State(state): State<AppState>) -> impl IntoResponse {
    let mut live = state.live.lock().await;
    match live.start().await {
        Ok(fix) => {
            // missing fix is non-blocking: surface a warning, keep capturing
            let warning = fix
                .is_none()
                .then(|| lookup(state.config.language, "locationAccessDenied").to_string());
            Json(ApiResponse::success(json!({
                "active": true,
                "location": fix,
                "warning": warning,
            })))
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn stop_capture(State(state): State<AppState>) -> impl IntoResponse {
    state.live.lock().await.stop();
    Json(ApiResponse::success(json!({ "active": false })))
}

async fn capture_status(State(state): State<AppState>) -> impl IntoResponse {
    let live = state.live.lock().await;
    Json(ApiResponse::success(json!({
        "active": live.is_active(),
        "location": live.current_fix(),
    })))
}

async fn capture_frame(State(state): State<AppState>) -> impl IntoResponse {
    let mut live = state.live.lock().await;
    match live.capture_frame().await {
        Ok(record) => {
            let summary = DraftSummary::from(&record);
            state.drafts.write().await.add(vec![record]);
            (StatusCode::CREATED, Json(ApiResponse::success(summary))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// ========================================
// Draft Handlers
// ========================================

async fn list_drafts(State(state): State<AppState>) -> impl IntoResponse {
    let drafts = state.drafts.read().await;
    let summaries: Vec<DraftSummary> = drafts.records().iter().map(DraftSummary::from).collect();
    Json(ApiResponse::success(summaries))
}

#[derive(Debug, Deserialize)]
struct SelectFilesRequest {
    paths: Vec<PathBuf>,
}

async fn select_files(
    State(state): State<AppState>,
    Json(req): Json<SelectFilesRequest>,
) -> impl IntoResponse {
    let mut files = state.files.lock().await;
    files.select(req.paths);

    match files.produce().await {
        Ok(records) => {
            let warning = (!records.is_empty() && records.iter().all(|r| r.location.is_none()))
                .then(|| lookup(state.config.language, "locationAccessDenied").to_string());
            let summaries: Vec<DraftSummary> = records.iter().map(DraftSummary::from).collect();
            state.drafts.write().await.add(records);
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(json!({
                    "drafts": summaries,
                    "warning": warning,
                }))),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn remove_draft(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    // unknown ids are a no-op by contract
    state.drafts.write().await.remove(id);
    Json(ApiResponse::success(json!({ "removed": id })))
}

// ========================================
// Submission Handlers
// ========================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    submitter_name: String,
    #[serde(default)]
    description: String,
}

async fn submit(State(state): State<AppState>, Json(req): Json<SubmitRequest>) -> impl IntoResponse {
    let mut drafts = state.drafts.write().await;
    match state
        .pipeline
        .submit(&mut drafts, &req.submitter_name, &req.description)
        .await
    {
        Ok(submitted) => Json(ApiResponse::success(json!({
            "submitted": submitted,
            "message": format!(
                "{} {}",
                submitted,
                lookup(state.config.language, "uploadSuccess")
            ),
        })))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn submit_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.pipeline.phase().await))
}

// ========================================
// Report Handlers
// ========================================

#[derive(Debug, Deserialize)]
struct ReportQuery {
    status: Option<String>,
}

async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let result = match query.status.as_deref() {
        Some(status) => {
            state
                .reports
                .list_by_status(ReportStatus::from(status))
                .await
        }
        None => state.reports.list().await,
    };

    match result {
        Ok(reports) => Json(ApiResponse::success(reports)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateReport>,
) -> impl IntoResponse {
    match state.reports.update(&id, req).await {
        Ok(()) => Json(ApiResponse::<()> {
            ok: true,
            data: None,
            error: None,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_report(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.reports.delete(&id).await {
        Ok(()) => Json(ApiResponse::<()> {
            ok: true,
            data: None,
            error: None,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
