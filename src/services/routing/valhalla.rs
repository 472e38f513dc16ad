//! Valhalla routing engine client
//!
//! Valhalla API documentation:
//! https://valhalla.github.io/valhalla/api/turn-by-turn/api-reference/
//!
//! Addresses are free text, so every request first goes through Nominatim
//! to obtain coordinates; Valhalla itself only speaks lat/lon.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::services::nominatim::NominatimClient;
use crate::types::Coordinates;

use super::{DirectionsError, DirectionsProvider};

/// Valhalla client configuration
#[derive(Debug, Clone)]
pub struct ValhallaConfig {
    /// Base URL of Valhalla server (e.g., "http://localhost:8002")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ValhallaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ValhallaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Valhalla-backed directions provider
pub struct ValhallaDirections {
    client: Client,
    config: ValhallaConfig,
    geocoder: NominatimClient,
}

impl ValhallaDirections {
    pub fn new(config: ValhallaConfig, nominatim_url: &str) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            geocoder: NominatimClient::new(nominatim_url),
        }
    }

    /// Geocode one address, mapping the two failure modes apart.
    async fn locate(&self, address: &str) -> Result<Coordinates, DirectionsError> {
        match self.geocoder.geocode(address).await {
            Ok(Some(coords)) => Ok(coords),
            Ok(None) => Err(DirectionsError::AddressNotFound(address.to_string())),
            Err(e) => Err(DirectionsError::ProviderUnavailable(format!(
                "geocoding failed: {e}"
            ))),
        }
    }

    /// Build the request body shared by /route and /optimized_route
    fn build_route_request(&self, locations: &[Coordinates]) -> RouteRequest {
        RouteRequest {
            locations: valhalla_locations(locations),
            costing: "auto".to_string(),
            directions_type: "none".to_string(), // We only need the summary, not maneuvers
        }
    }

    /// POST with a single retry on transient transport failure.
    async fn post_json<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, DirectionsError> {
        match self.client.post(url).json(body).send().await {
            Ok(response) => Ok(response),
            Err(e) if e.is_timeout() || e.is_connect() => {
                warn!("Transient Valhalla error, retrying once: {}", e);
                self.client.post(url).json(body).send().await.map_err(|e| {
                    DirectionsError::ProviderUnavailable(format!(
                        "request to {url} failed after retry: {e}"
                    ))
                })
            }
            Err(e) => Err(DirectionsError::ProviderUnavailable(format!(
                "request to {url} failed: {e}"
            ))),
        }
    }
}

#[async_trait]
impl DirectionsProvider for ValhallaDirections {
    async fn drive_duration(&self, from: &str, to: &str) -> Result<u64, DirectionsError> {
        let origin = self.locate(from).await?;
        let destination = self.locate(to).await?;

        let request = self.build_route_request(&[origin, destination]);
        let url = format!("{}/route", self.config.base_url);

        debug!("Requesting drive duration from Valhalla: {:?} -> {:?}", from, to);

        let response = self.post_json(&url, &request).await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            // Valhalla answers 400 when no path connects the locations
            return Err(DirectionsError::NoRoute {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::ProviderUnavailable(format!(
                "Valhalla route returned error {status}: {body}"
            )));
        }

        let route: RouteResponse = response.json().await.map_err(|e| {
            DirectionsError::ProviderUnavailable(format!("Failed to parse Valhalla response: {e}"))
        })?;

        Ok(route.trip.summary.time.round() as u64)
    }

    async fn optimize_waypoints(
        &self,
        depot: &str,
        stops: &[String],
    ) -> Result<Vec<usize>, DirectionsError> {
        let depot_coords = self.locate(depot).await?;
        let mut locations = Vec::with_capacity(stops.len() + 2);
        locations.push(depot_coords);
        for stop in stops {
            locations.push(self.locate(stop).await?);
        }
        locations.push(depot_coords);

        let request = self.build_route_request(&locations);
        let url = format!("{}/optimized_route", self.config.base_url);

        debug!("Requesting optimized order from Valhalla for {} stops", stops.len());

        let response = self.post_json(&url, &request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectionsError::ProviderUnavailable(format!(
                "Valhalla optimized_route returned error {status}: {body}"
            )));
        }

        let optimized: OptimizedResponse = response.json().await.map_err(|e| {
            DirectionsError::ProviderUnavailable(format!("Failed to parse Valhalla response: {e}"))
        })?;

        visiting_order(&optimized.trip.locations, stops.len())
    }

    fn name(&self) -> &'static str {
        "valhalla"
    }
}

fn valhalla_locations(locations: &[Coordinates]) -> Vec<ValhallaLocation> {
    locations
        .iter()
        .map(|c| ValhallaLocation {
            lat: c.lat,
            lon: c.lng,
            // 500m radius – sufficient for Nominatim-geocoded coordinates
            // that may be slightly off-road (building centroid vs road edge)
            radius: Some(500),
        })
        .collect()
}

/// Extract the stop visiting order from an optimized_route response.
///
/// The response echoes the request locations in visiting order, each tagged
/// with its `original_index`; index 0 and the final entry are the depot.
fn visiting_order(
    locations: &[TripLocation],
    stop_count: usize,
) -> Result<Vec<usize>, DirectionsError> {
    if locations.len() != stop_count + 2 {
        return Err(DirectionsError::ProviderUnavailable(format!(
            "optimized_route returned {} locations for {} stops",
            locations.len(),
            stop_count
        )));
    }

    let mut order = Vec::with_capacity(stop_count);
    for loc in &locations[1..locations.len() - 1] {
        let idx = loc.original_index;
        if idx == 0 || idx > stop_count {
            return Err(DirectionsError::ProviderUnavailable(format!(
                "optimized_route returned out-of-range original_index {idx}"
            )));
        }
        order.push(idx - 1);
    }

    Ok(order)
}

// Valhalla API types

#[derive(Debug, Serialize)]
struct RouteRequest {
    locations: Vec<ValhallaLocation>,
    costing: String,
    directions_type: String,
}

#[derive(Debug, Serialize, Clone)]
struct ValhallaLocation {
    lat: f64,
    lon: f64,
    /// Radius in meters for snapping to roads (default ~35m, we use much larger for geocoded addresses)
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    trip: RouteTrip,
}

#[derive(Debug, Deserialize)]
struct RouteTrip {
    summary: TripSummary,
}

#[derive(Debug, Deserialize)]
struct TripSummary {
    /// Total drive time in seconds
    time: f64,
}

#[derive(Debug, Deserialize)]
struct OptimizedResponse {
    trip: OptimizedTrip,
}

#[derive(Debug, Deserialize)]
struct OptimizedTrip {
    locations: Vec<TripLocation>,
}

#[derive(Debug, Deserialize)]
struct TripLocation {
    original_index: usize,
}
