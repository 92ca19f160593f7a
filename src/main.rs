//! Safai Report Service
//!
//! Main entry point for the report capture service.

use safai_report::{
    capture::{FileCaptureSource, LiveCaptureSource},
    draft_store::DraftStore,
    geolocate::GeoLocator,
    image_gateway::ImageHostClient,
    report_gateway::ReportStoreClient,
    state::{AppConfig, AppState},
    submission::SubmissionPipeline,
    web_api,
};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safai_report=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Safai Report Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        cloud_name = %config.cloud_name,
        upload_preset = %config.upload_preset,
        report_store_url = %config.report_store_url,
        report_collection = %config.report_collection,
        camera_device = %config.camera_device,
        preview_dir = %config.preview_dir.display(),
        language = config.language.as_str(),
        "Configuration loaded"
    );

    // Gateway configuration is validated once, before any work is accepted
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Configuration invalid, refusing to start");
        return Err(e.into());
    }

    tokio::fs::create_dir_all(&config.preview_dir).await?;

    // Initialize components
    let locator = Arc::new(GeoLocator::new(config.location_source_url.clone()));
    if config.location_source_url.is_none() {
        tracing::warn!("LOCATION_SOURCE_URL not set, reports will carry no coordinates");
    }

    let live = Arc::new(Mutex::new(LiveCaptureSource::new(
        config.camera_device.clone(),
        config.preview_dir.clone(),
        locator.clone(),
    )));
    let files = Arc::new(Mutex::new(FileCaptureSource::new(
        config.preview_dir.clone(),
        locator.clone(),
    )));
    tracing::info!("Capture sources initialized (live + file selection)");

    let drafts = Arc::new(RwLock::new(DraftStore::new()));

    let images = ImageHostClient::new(config.image_host());
    let reports = ReportStoreClient::new(
        config.report_store_url.clone(),
        config.report_collection.clone(),
    );
    let pipeline = Arc::new(SubmissionPipeline::new(images, reports.clone()));
    tracing::info!("Submission pipeline initialized");

    // Create application state
    let state = AppState {
        config,
        drafts,
        live,
        files,
        locator,
        pipeline,
        reports,
    };

    // Create router
    let app = web_api::create_router(state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
