//! Location enrichment for generated itineraries.
//!
//! Attaches real coordinates to each generated day and gathers the
//! surrounding context (nearby cities, reverse-geocoded destination names)
//! used for prompting and fallbacks. Geocoding is best-effort: a day whose
//! location cannot be resolved keeps a (0, 0) sentinel and is flagged
//! `unresolved` rather than being given invented coordinates.

use crate::clients::geocoding::{GeocodingClient, LocationDetails};
use crate::clients::geodb::NearbyCitiesClient;
use crate::models::plan::{DayPlan, LocationSource, RawDay};
use crate::utils::geography::distance_km;

/// Destination context gathered once per request.
#[derive(Debug, Clone, Default)]
pub struct LocationContext {
    pub nearby_cities: Vec<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl LocationContext {
    /// Human-readable destination name for prompts, most specific first.
    pub fn destination_label(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.region.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

pub struct LocationService {
    geocoder: GeocodingClient,
    nearby_client: NearbyCitiesClient,
}

impl LocationService {
    pub fn new() -> Self {
        Self {
            geocoder: GeocodingClient::new(),
            nearby_client: NearbyCitiesClient::new(),
        }
    }

    /// Fetch nearby cities and reverse-geocode the trip origin.
    pub async fn gather_context(&self, coords: (f64, f64), radius_km: u32) -> LocationContext {
        let nearby_cities = self
            .nearby_client
            .nearby_cities(coords.0, coords.1, radius_km)
            .await;

        let details = self
            .geocoder
            .reverse_geocode(coords.0, coords.1)
            .await
            .unwrap_or_else(LocationDetails::default);

        LocationContext {
            nearby_cities,
            city: details.city,
            region: details.region,
            country: details.country,
        }
    }

    /// Resolve coordinates for every generated day and attach distances.
    pub async fn enrich_days(
        &self,
        days: Vec<RawDay>,
        start_coords: (f64, f64),
        radius_km: u32,
        nearby_cities: &[String],
    ) -> Vec<DayPlan> {
        let mut enriched = Vec::with_capacity(days.len());
        for raw in days {
            let (coords, source) = self.resolve_coordinates(&raw, nearby_cities).await;
            enriched.push(build_day(raw, coords, source, start_coords, radius_km));
        }
        enriched
    }

    /// Try increasingly vague queries until one geocodes. Order matters:
    /// "place, town" is the most specific and the most likely to pin the
    /// right venue; a bare nearby city is a last resort before giving up.
    async fn resolve_coordinates(
        &self,
        raw: &RawDay,
        nearby_cities: &[String],
    ) -> ((f64, f64), LocationSource) {
        if !raw.place.is_empty() && !raw.town.is_empty() {
            if let Some(coords) = self.geocoder.geocode(&raw.place, &raw.town).await {
                return (coords, LocationSource::PlaceAndTown);
            }
        }

        if !raw.place.is_empty() {
            if let Some(coords) = self.geocoder.geocode_single(&raw.place).await {
                return (coords, LocationSource::Place);
            }
        }

        if !raw.town.is_empty() {
            if let Some(coords) = self.geocoder.geocode_single(&raw.town).await {
                return (coords, LocationSource::Town);
            }
        }

        if let Some(city) = nearby_cities.first() {
            println!(
                "Could not geocode '{}'/'{}', falling back to nearby city '{}'",
                raw.place, raw.town, city
            );
            if let Some(coords) = self.geocoder.geocode_single(city).await {
                return (coords, LocationSource::NearbyCity);
            }
        }

        println!("No coordinates found for '{}' / '{}'", raw.place, raw.town);
        ((0.0, 0.0), LocationSource::Unresolved)
    }
}

impl Default for LocationService {
    fn default() -> Self {
        Self::new()
    }
}

fn build_day(
    raw: RawDay,
    coords: (f64, f64),
    source: LocationSource,
    start_coords: (f64, f64),
    radius_km: u32,
) -> DayPlan {
    let distance_from_start = if source == LocationSource::Unresolved {
        0.0
    } else {
        let d = distance_km(start_coords, coords);
        if d > radius_km as f64 {
            // Keep the real coordinates, the model just strayed out of range
            println!(
                "'{}' is {:.1}km from start, outside the {}km radius",
                raw.place, d, radius_km
            );
        }
        (d * 10.0).round() / 10.0
    };

    DayPlan {
        day: raw.day,
        date: None,
        formatted_date: None,
        town: raw.town,
        place: raw.place,
        activities: raw.activities,
        lat: coords.0,
        lng: coords.1,
        location_source: source,
        distance_from_start,
        travel_distance_km: 0.0,
        route: vec![],
    }
}
