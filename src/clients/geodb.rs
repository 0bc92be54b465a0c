//! GeoDB Cities client (via RapidAPI) for nearby-city lookups.
//!
//! Returns an empty list on any failure — nearby cities are prompt context,
//! never a correctness requirement.

use reqwest;
use serde::Deserialize;
use std::{env, time::Duration};

const GEODB_BASE_URL: &str = "https://wft-geo-db.p.rapidapi.com/v1/geo";
const RAPIDAPI_HOST: &str = "wft-geo-db.p.rapidapi.com";

#[derive(Debug, Deserialize)]
struct GeoDbResponse {
    #[serde(default)]
    data: Vec<GeoDbCity>,
}

#[derive(Debug, Deserialize)]
struct GeoDbCity {
    city: String,
}

pub struct NearbyCitiesClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl NearbyCitiesClient {
    pub fn new() -> Self {
        let api_key = env::var("RAPIDAPI_KEY").ok().filter(|k| !k.is_empty());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            api_key,
        }
    }

    pub async fn nearby_cities(&self, lat: f64, lng: f64, radius_km: u32) -> Vec<String> {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => {
                println!("No RAPIDAPI_KEY found, skipping nearby cities");
                return Vec::new();
            }
        };

        // GeoDB expects ISO-6709 style "lat±lng" in the path
        let formatted_coords = format!("{:.4}{:+.4}", lat, lng);
        let url = format!("{}/locations/{}/nearbyCities", GEODB_BASE_URL, formatted_coords);

        println!(
            "Calling GeoDB API with coordinates: {}, radius: {}km",
            formatted_coords, radius_km
        );

        let response = self
            .http_client
            .get(&url)
            .header("X-RapidAPI-Key", &api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[
                ("radius", radius_km.to_string()),
                ("limit", "10".to_string()),
                ("minPopulation", "1000".to_string()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Error calling GeoDB API: {}", e);
                return Vec::new();
            }
        };

        match response.status().as_u16() {
            200 => self.extract_cities(response).await,
            400 => {
                println!("GeoDB API error 400 - Bad request. Trying alternative format...");
                self.nearby_cities_fallback(lat, lng, radius_km, &api_key).await
            }
            429 => {
                println!("GeoDB API rate limit exceeded");
                Vec::new()
            }
            status => {
                println!("GeoDB API returned status {}", status);
                Vec::new()
            }
        }
    }

    /// Alternate query shape, tried once when the primary form is rejected.
    async fn nearby_cities_fallback(
        &self,
        lat: f64,
        lng: f64,
        radius_km: u32,
        api_key: &str,
    ) -> Vec<String> {
        let url = format!("{}/cities", GEODB_BASE_URL);

        println!("Trying fallback GeoDB API call...");
        let response = self
            .http_client
            .get(&url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[
                ("location", format!("{},{}", lat, lng)),
                ("radius", radius_km.to_string()),
                ("limit", "5".to_string()),
                ("minPopulation", "1000".to_string()),
            ])
            .send()
            .await;

        match response {
            Ok(r) if r.status().is_success() => self.extract_cities(r).await,
            Ok(_) | Err(_) => {
                println!("Fallback GeoDB API also failed");
                Vec::new()
            }
        }
    }

    async fn extract_cities(&self, response: reqwest::Response) -> Vec<String> {
        match response.json::<GeoDbResponse>().await {
            Ok(data) => {
                let cities: Vec<String> = data.data.into_iter().map(|c| c.city).collect();
                println!("Found {} nearby cities: {:?}", cities.len(), cities);
                cities
            }
            Err(e) => {
                eprintln!("Failed to parse GeoDB response: {}", e);
                Vec::new()
            }
        }
    }
}

impl Default for NearbyCitiesClient {
    fn default() -> Self {
        Self::new()
    }
}
