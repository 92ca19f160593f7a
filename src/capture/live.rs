//! Live capture mode - still frames sampled from an exclusive camera stream

use crate::capture::{store_preview, CaptureRecord, CaptureSource};
use crate::error::{Error, Result};
use crate::geolocate::{GeoLocator, LocationFix};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// ffmpeg timeout for a single frame grab
const FRAME_TIMEOUT: Duration = Duration::from_secs(10);

/// Exclusive hold on the camera stream.
///
/// At most one lease exists per source; dropping it is the release, so the
/// stream is returned on stop, teardown, and every error path.
struct StreamLease {
    device_url: String,
}

impl StreamLease {
    fn acquire(device_url: &str) -> Self {
        tracing::info!(device = %device_url, "Camera stream opened");
        Self {
            device_url: device_url.to_string(),
        }
    }
}

impl Drop for StreamLease {
    fn drop(&mut self) {
        tracing::info!(device = %self.device_url, "Camera stream released");
    }
}

/// Live camera capture source
///
/// Wraps the rear-facing camera stream (video only, no audio). Frames are
/// sampled on demand with ffmpeg at a fixed JPEG quality and tagged with
/// the fix resolved when the stream was opened; that fix may be stale
/// relative to the exact capture instant.
pub struct LiveCaptureSource {
    device_url: String,
    preview_dir: PathBuf,
    locator: Arc<GeoLocator>,
    stream: Option<StreamLease>,
    session_fix: Option<LocationFix>,
}

impl LiveCaptureSource {
    pub fn new(device_url: String, preview_dir: PathBuf, locator: Arc<GeoLocator>) -> Self {
        Self {
            device_url,
            preview_dir,
            locator,
            stream: None,
            session_fix: None,
        }
    }

    /// Open the camera stream and resolve the session fix.
    ///
    /// Calling `start` while the stream is already open is a no-op.
    /// Geolocation failure does not block the session: the source keeps
    /// capturing with `location = None` and the caller surfaces a warning.
    pub async fn start(&mut self) -> Result<Option<LocationFix>> {
        if self.stream.is_some() {
            tracing::debug!(device = %self.device_url, "Camera already active, start ignored");
            return Ok(self.session_fix);
        }

        self.session_fix = match self.locator.resolve().await {
            Ok(fix) => Some(fix),
            Err(e) => {
                tracing::warn!(error = %e, "Location unavailable, capturing without a fix");
                None
            }
        };

        self.stream = Some(StreamLease::acquire(&self.device_url));
        Ok(self.session_fix)
    }

    /// Close the camera stream
    pub fn stop(&mut self) {
        self.stream.take();
        self.session_fix = None;
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Fix attached to frames captured in this session
    pub fn current_fix(&self) -> Option<LocationFix> {
        self.session_fix
    }

    /// Sample the current frame into a pending draft record
    pub async fn capture_frame(&mut self) -> Result<CaptureRecord> {
        if self.stream.is_none() {
            return Err(Error::NotActive);
        }

        let data = self.grab_frame().await?;
        let preview = store_preview(&self.preview_dir, &data).await?;
        let record = CaptureRecord::new(data, preview, self.session_fix);

        tracing::debug!(
            draft_id = %record.id,
            size = record.image_data.len(),
            has_location = record.location.is_some(),
            "Frame captured"
        );

        Ok(record)
    }

    /// Grab one JPEG frame from the stream with ffmpeg
    ///
    /// Uses kill_on_drop(true) so a timeout drops the Child and SIGKILLs
    /// the ffmpeg process instead of leaving it attached to the camera.
    async fn grab_frame(&self) -> Result<Vec<u8>> {
        let args = frame_args(&self.device_url);
        let child = Command::new("ffmpeg")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Internal(format!("ffmpeg spawn failed: {}", e)))?;

        match tokio::time::timeout(FRAME_TIMEOUT, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(Error::Internal(format!(
                        "ffmpeg failed: {}",
                        stderr.trim()
                    )));
                }
                if output.stdout.is_empty() {
                    return Err(Error::Internal("ffmpeg returned empty output".to_string()));
                }
                Ok(output.stdout)
            }
            Ok(Err(e)) => Err(Error::Internal(format!("ffmpeg execution failed: {}", e))),
            Err(_) => {
                tracing::warn!(
                    device = %self.device_url,
                    timeout_sec = FRAME_TIMEOUT.as_secs(),
                    "ffmpeg timeout, process killed via kill_on_drop"
                );
                Err(Error::Internal(format!(
                    "ffmpeg timeout ({}s)",
                    FRAME_TIMEOUT.as_secs()
                )))
            }
        }
    }
}

impl CaptureSource for LiveCaptureSource {
    async fn produce(&mut self) -> Result<Vec<CaptureRecord>> {
        Ok(vec![self.capture_frame().await?])
    }
}

/// ffmpeg argument list for a single-frame grab at fixed quality.
///
/// -q:v 2 keeps the MJPEG encode at roughly 90% JPEG quality.
fn frame_args(device_url: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();

    if device_url.starts_with("rtsp://") {
        args.extend(["-rtsp_transport".into(), "tcp".into()]);
    } else if device_url.starts_with("/dev/") {
        args.extend(["-f".into(), "v4l2".into()]);
    }

    args.extend([
        "-i".into(),
        device_url.into(),
        "-frames:v".into(),
        "1".into(),
        "-f".into(),
        "image2pipe".into(),
        "-vcodec".into(),
        "mjpeg".into(),
        "-q:v".into(),
        "2".into(),
        "-an".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-".into(),
    ]);

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> LiveCaptureSource {
        let dir = std::env::temp_dir().join(format!("safai-live-{}", uuid::Uuid::new_v4()));
        LiveCaptureSource::new("/dev/video0".to_string(), dir, Arc::new(GeoLocator::new(None)))
    }

    #[tokio::test]
    async fn test_capture_without_start_fails_not_active() {
        let mut live = source();
        match live.capture_frame().await {
            Err(Error::NotActive) => {}
            other => panic!("expected NotActive, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let mut live = source();
        live.start().await.unwrap();
        assert!(live.is_active());

        // second start is a no-op, not an error
        live.start().await.unwrap();
        assert!(live.is_active());

        live.stop();
        assert!(!live.is_active());
        assert!(live.current_fix().is_none());
    }

    #[tokio::test]
    async fn test_start_without_location_source_continues_without_fix() {
        let mut live = source();
        let fix = live.start().await.unwrap();
        assert!(fix.is_none());
        assert!(live.is_active());
    }

    #[tokio::test]
    async fn test_session_fix_comes_from_the_locator() {
        let dir = std::env::temp_dir().join(format!("safai-live-{}", uuid::Uuid::new_v4()));
        let locator = Arc::new(GeoLocator::new(None));
        locator
            .seed(LocationFix {
                latitude: 12.97,
                longitude: 77.59,
                accuracy: 10.0,
            })
            .await;

        let mut live = LiveCaptureSource::new("/dev/video0".to_string(), dir, locator);
        let fix = live.start().await.unwrap().expect("seeded fix");
        assert_eq!(fix.latitude, 12.97);
        assert_eq!(live.current_fix().unwrap().longitude, 77.59);
    }

    #[test]
    fn test_frame_args_rtsp_transport() {
        let args = frame_args("rtsp://cam.local/stream1");
        assert_eq!(args[0], "-rtsp_transport");
        assert!(args.contains(&"-q:v".to_string()));
        assert!(args.contains(&"-an".to_string()));
    }

    #[test]
    fn test_frame_args_v4l2_device() {
        let args = frame_args("/dev/video0");
        assert_eq!(args[0], "-f");
        assert_eq!(args[1], "v4l2");
    }
}
