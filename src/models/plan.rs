use serde::{Deserialize, Serialize};

use crate::models::weather::WeatherReport;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// How a day's coordinates were obtained. `Unresolved` marks the (0, 0)
/// sentinel so a missing geocode is never presented as a real location.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    PlaceAndTown,
    Place,
    Town,
    NearbyCity,
    Unresolved,
}

/// One day entry as emitted by the generation backend, before enrichment.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RawDay {
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub town: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

/// A fully enriched, route-ordered day of the itinerary.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DayPlan {
    pub day: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_date: Option<String>,
    pub town: String,
    pub place: String,
    pub activities: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    pub location_source: LocationSource,
    pub distance_from_start: f64,
    pub travel_distance_km: f64,
    pub route: Vec<Coordinates>,
}

impl DayPlan {
    pub fn coordinates(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryResponse {
    pub plan: Vec<DayPlan>,
    pub nearby_cities: Vec<String>,
    pub user_coordinates: Coordinates,
    pub search_radius: u32,
    pub travel_dates: Vec<String>,
    pub total_days: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherReport>,
    /// False when freshly generated; flipped to true when the payload is
    /// served from the cache or from a coalesced in-flight generation.
    pub cached: bool,
    pub generated_at: String,
}
