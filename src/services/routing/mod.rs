//! Directions provider abstraction
//!
//! Valhalla (with Nominatim geocoding) for production, a deterministic
//! offline estimator for tests and explicitly configured degraded runs.

mod valhalla;

pub use valhalla::{ValhallaConfig, ValhallaDirections};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, DirectionsBackend};

/// Failures a directions backend can surface. Kinds are distinguishable so
/// callers can react (abort vs. keep input order) without string matching.
#[derive(Debug, Error)]
pub enum DirectionsError {
    #[error("directions provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("no drivable route from '{from}' to '{to}'")]
    NoRoute { from: String, to: String },

    #[error("address could not be geocoded: '{0}'")]
    AddressNotFound(String),

    #[error("{backend} backend does not support waypoint optimization")]
    OptimizationUnsupported { backend: &'static str },
}

/// Routing provider contract: per-leg drive durations plus round-trip
/// waypoint ordering. Any vendor satisfying these two operations fits.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Real-world driving duration between two free-text addresses, in seconds.
    async fn drive_duration(&self, from: &str, to: &str) -> Result<u64, DirectionsError>;

    /// Visiting order for a round trip depot → stops → depot that minimizes
    /// total travel. Returns a permutation of indices into `stops`.
    async fn optimize_waypoints(
        &self,
        depot: &str,
        stops: &[String],
    ) -> Result<Vec<usize>, DirectionsError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Deterministic offline drive-time estimator.
///
/// Estimates grow with the combined address length, so distinct address
/// pairs get distinct but stable durations. Exists for offline testing and
/// explicitly configured degraded runs only; it has no notion of geography
/// and must never stand in for a real provider in production configs.
pub struct OfflineDirections {
    seconds_per_char: u64,
}

impl Default for OfflineDirections {
    fn default() -> Self {
        // ~80 chars for a typical address pair ≈ one hour of driving
        Self { seconds_per_char: 45 }
    }
}

impl OfflineDirections {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectionsProvider for OfflineDirections {
    async fn drive_duration(&self, from: &str, to: &str) -> Result<u64, DirectionsError> {
        let chars = (from.trim().len() + to.trim().len()).max(8) as u64;
        Ok(chars * self.seconds_per_char)
    }

    async fn optimize_waypoints(
        &self,
        _depot: &str,
        _stops: &[String],
    ) -> Result<Vec<usize>, DirectionsError> {
        Err(DirectionsError::OptimizationUnsupported { backend: "offline" })
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// Build the configured directions provider.
///
/// The backend is an explicit configuration choice; the offline estimator is
/// never substituted silently after a provider failure.
pub fn create_directions_provider(config: &Config) -> Arc<dyn DirectionsProvider> {
    match &config.directions_backend {
        DirectionsBackend::Valhalla {
            valhalla_url,
            nominatim_url,
        } => {
            info!("Using Valhalla directions at {}", valhalla_url);
            Arc::new(ValhallaDirections::new(
                ValhallaConfig::new(valhalla_url),
                nominatim_url,
            ))
        }
        DirectionsBackend::Offline => {
            warn!("Using the offline drive-time estimator: schedules are not based on real road data");
            Arc::new(OfflineDirections::new())
        }
    }
}
