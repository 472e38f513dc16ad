//! Nominatim geocoding client

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::Coordinates;

/// Nominatim API response
#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// Nominatim geocoding client
pub struct NominatimClient {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimClient {
    /// Create a new client
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("runsheet/0.1 (delivery schedule generator)")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.to_string(),
            client,
        }
    }

    /// Geocode a free-text address to coordinates
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(address.trim())
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Nominatim returned status {}", response.status());
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        if let Some(result) = results.first() {
            let lat: f64 = result.lat.parse().context("Invalid latitude")?;
            let lng: f64 = result.lon.parse().context("Invalid longitude")?;

            tracing::debug!("Geocoded {:?} as {}", address, result.display_name);
            Ok(Some(Coordinates { lat, lng }))
        } else {
            Ok(None)
        }
    }
}
