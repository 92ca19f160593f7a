//! GeoLocator - Single-Shot Location Fixes
//!
//! ## Responsibilities
//!
//! - One high-accuracy fix per request against the configured location source
//! - Bounded wait (10s request timeout)
//! - Cached-fix tolerance (a fix younger than 60s is reused without a new query)
//!
//! A missing fix is a first-class state, not an error: callers are expected to
//! catch `LocationUnavailable`, warn, and continue with `location = None`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Request timeout for the location source
const FIX_TIMEOUT: Duration = Duration::from_secs(10);

/// A cached fix younger than this is returned without a fresh query
const MAX_FIX_AGE: Duration = Duration::from_secs(60);

/// A single resolved geolocation reading. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated accuracy radius in meters
    pub accuracy: f64,
}

/// Cached fix with its resolution instant
struct CachedFix {
    fix: LocationFix,
    resolved_at: Instant,
}

/// GeoLocator instance
pub struct GeoLocator {
    http: reqwest::Client,
    /// Location source endpoint; `None` means the capability is absent
    source_url: Option<String>,
    last_fix: RwLock<Option<CachedFix>>,
}

impl GeoLocator {
    /// Create a new GeoLocator
    ///
    /// `source_url` points at an HTTP endpoint returning
    /// `{"latitude": .., "longitude": .., "accuracy": ..}`. When it is
    /// `None`, every resolution fails with `LocationUnavailable`.
    pub fn new(source_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(FIX_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            source_url,
            last_fix: RwLock::new(None),
        }
    }

    /// Resolve a single fix
    ///
    /// Returns the cached fix when it is younger than the tolerance,
    /// otherwise queries the location source once with a bounded wait.
    pub async fn resolve(&self) -> Result<LocationFix> {
        if let Some(fix) = self.cached().await {
            tracing::debug!(
                latitude = fix.latitude,
                longitude = fix.longitude,
                "Reusing cached location fix"
            );
            return Ok(fix);
        }

        let url = self
            .source_url
            .as_deref()
            .ok_or_else(|| Error::LocationUnavailable("no location source configured".into()))?;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::LocationUnavailable(format!("location source error: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::LocationUnavailable(format!(
                "location source returned {}",
                resp.status()
            )));
        }

        let fix: LocationFix = resp
            .json()
            .await
            .map_err(|e| Error::LocationUnavailable(format!("location parse error: {}", e)))?;

        tracing::debug!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            accuracy_m = fix.accuracy,
            "Resolved location fix"
        );

        *self.last_fix.write().await = Some(CachedFix {
            fix,
            resolved_at: Instant::now(),
        });

        Ok(fix)
    }

    /// Last resolved fix regardless of age, for display purposes
    pub async fn last_known(&self) -> Option<LocationFix> {
        self.last_fix.read().await.as_ref().map(|c| c.fix)
    }

    /// Cached fix if still within the tolerance window
    async fn cached(&self) -> Option<LocationFix> {
        let guard = self.last_fix.read().await;
        guard
            .as_ref()
            .filter(|c| c.resolved_at.elapsed() < MAX_FIX_AGE)
            .map(|c| c.fix)
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, fix: LocationFix) {
        *self.last_fix.write().await = Some(CachedFix {
            fix,
            resolved_at: Instant::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, lon: f64) -> LocationFix {
        LocationFix {
            latitude: lat,
            longitude: lon,
            accuracy: 15.0,
        }
    }

    #[tokio::test]
    async fn test_resolve_without_source_is_unavailable() {
        let locator = GeoLocator::new(None);
        match locator.resolve().await {
            Err(Error::LocationUnavailable(_)) => {}
            other => panic!("expected LocationUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_fresh_cache_short_circuits_the_query() {
        // No source configured, so a network query would fail; a fresh
        // cached fix must be returned without one.
        let locator = GeoLocator::new(None);
        locator.seed(fix(12.97, 77.59)).await;

        let resolved = locator.resolve().await.expect("cached fix");
        assert_eq!(resolved.latitude, 12.97);
        assert_eq!(resolved.longitude, 77.59);
    }

    #[tokio::test]
    async fn test_last_known_survives_staleness() {
        let locator = GeoLocator::new(None);
        assert!(locator.last_known().await.is_none());

        locator.seed(fix(12.98, 77.60)).await;
        assert_eq!(locator.last_known().await.unwrap().longitude, 77.60);
    }

    #[test]
    fn test_fix_wire_format() {
        let parsed: LocationFix =
            serde_json::from_str(r#"{"latitude":12.97,"longitude":77.59,"accuracy":8.5}"#)
                .unwrap();
        assert_eq!(parsed.accuracy, 8.5);
    }
}
