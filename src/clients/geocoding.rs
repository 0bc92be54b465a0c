//! Google Maps Geocoding API client.
//!
//! All lookups degrade to `None` — a missing API key, a provider error or
//! an empty result set are equivalent to "no match" for the pipeline.

use reqwest;
use serde::Deserialize;
use std::{env, time::Duration};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationDetails {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

pub struct GeocodingClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl GeocodingClient {
    pub fn new() -> Self {
        let api_key = env::var("GOOGLE_MAPS_API_KEY").ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            println!("No GOOGLE_MAPS_API_KEY found, geocoding disabled");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            api_key,
        }
    }

    /// Geocode a "place, town" pair.
    pub async fn geocode(&self, place: &str, town: &str) -> Option<(f64, f64)> {
        let query = format!("{}, {}", place, town);
        let query = query.trim_matches(|c| c == ',' || c == ' ');
        if query.is_empty() {
            return None;
        }
        self.geocode_single(query).await
    }

    /// Geocode a single free-text location name.
    pub async fn geocode_single(&self, query: &str) -> Option<(f64, f64)> {
        let api_key = self.api_key.as_ref()?;

        let response = self
            .http_client
            .get(GEOCODE_URL)
            .query(&[("address", query), ("key", api_key)])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                eprintln!("Geocoding returned status {} for '{}'", r.status(), query);
                return None;
            }
            Err(e) => {
                eprintln!("Geocoding error for '{}': {}", query, e);
                return None;
            }
        };

        let data: GeocodeResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Failed to parse geocoding response: {}", e);
                return None;
            }
        };

        if data.status != "OK" {
            return None;
        }

        data.results
            .first()
            .map(|r| (r.geometry.location.lat, r.geometry.location.lng))
    }

    /// Resolve coordinates to city/region/country names.
    pub async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<LocationDetails> {
        let api_key = self.api_key.as_ref()?;

        let latlng = format!("{},{}", lat, lng);
        let response = self
            .http_client
            .get(GEOCODE_URL)
            .query(&[
                ("latlng", latlng.as_str()),
                ("key", api_key.as_str()),
                (
                    "result_type",
                    "locality|administrative_area_level_1|country",
                ),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(_) | Err(_) => {
                eprintln!("Reverse geocoding request failed for ({}, {})", lat, lng);
                return None;
            }
        };

        let data: GeocodeResponse = response.json().await.ok()?;
        if data.status != "OK" || data.results.is_empty() {
            return None;
        }

        let mut details = LocationDetails::default();
        for component in &data.results[0].address_components {
            if component.types.iter().any(|t| t == "locality") {
                details.city = Some(component.long_name.clone());
            } else if component
                .types
                .iter()
                .any(|t| t == "administrative_area_level_1")
            {
                details.region = Some(component.long_name.clone());
            } else if component.types.iter().any(|t| t == "country") {
                details.country = Some(component.long_name.clone());
            }
        }

        Some(details)
    }
}

impl Default for GeocodingClient {
    fn default() -> Self {
        Self::new()
    }
}
