//! End-to-end itinerary pipeline.
//!
//! Orchestrates the full flow for a request: validation, cache lookup,
//! in-flight coalescing, context gathering, generation, geocode enrichment,
//! route optimization, date and weather annotation, response assembly and
//! cache write. Only request validation can fail; every downstream problem
//! degrades to a usable (possibly fallback) plan.

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::models::plan::{Coordinates, DayPlan, ItineraryResponse};
use crate::models::requests::ItineraryRequest;
use crate::services::cache_service::CacheService;
use crate::services::inflight::{Admission, InFlightRegistry};
use crate::services::llm_service::LlmService;
use crate::services::location_service::LocationService;
use crate::services::route_optimizer::RouteOptimizer;
use crate::services::weather_service::WeatherService;

/// Fraction of requests that trigger an expired-entry sweep as a side
/// effect, so the cache stays bounded without a dedicated scheduler.
const SWEEP_PROBABILITY: f64 = 0.01;

#[derive(Debug)]
pub enum ItineraryError {
    Validation(String),
    Internal(String),
}

impl fmt::Display for ItineraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryError::Validation(msg) => write!(f, "Invalid request: {}", msg),
            ItineraryError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error for ItineraryError {}

pub struct ItineraryService {
    location_service: LocationService,
    weather_service: WeatherService,
    llm_service: LlmService,
    route_optimizer: RouteOptimizer,
    cache: Arc<CacheService>,
    inflight: Arc<InFlightRegistry>,
}

impl ItineraryService {
    pub fn new(cache: Arc<CacheService>) -> Self {
        Self {
            location_service: LocationService::new(),
            weather_service: WeatherService::new(),
            llm_service: LlmService::new(),
            route_optimizer: RouteOptimizer::new(),
            cache,
            inflight: Arc::new(InFlightRegistry::new()),
        }
    }

    pub async fn generate_itinerary(
        &self,
        request: &ItineraryRequest,
    ) -> Result<Value, ItineraryError> {
        let coords = validate_request(request)?;
        let sorted_dates = request.sorted_dates();

        println!(
            "Planning itinerary for {} days at {:?}",
            sorted_dates.len(),
            coords
        );

        let hash = CacheService::request_hash(
            &request.destination,
            &sorted_dates,
            &request.preferences,
            request.radius,
        );

        // Age out expired entries on a small fraction of all requests,
        // cache hits and coalesced followers included
        if rand::random::<f64>() < SWEEP_PROBABILITY {
            let cache = Arc::clone(&self.cache);
            tokio::spawn(async move {
                cache.sweep_expired().await;
            });
        }

        if let Some(payload) = self.cache.lookup(&hash).await {
            return Ok(mark_cached(payload));
        }

        // First concurrent miss generates; duplicates wait for its payload
        let guard = match self.inflight.admit(&hash) {
            Admission::Leader(guard) => Some(guard),
            Admission::Follower(handle) => {
                println!("Awaiting in-flight generation for hash {}", hash);
                match handle.wait().await {
                    Some(payload) => return Ok(mark_cached(payload)),
                    // Leader failed, generate independently
                    None => None,
                }
            }
        };

        let payload = self
            .build_response(request, coords, &sorted_dates, &hash)
            .await?;

        if let Some(guard) = guard {
            guard.complete(payload.clone());
        }

        Ok(payload)
    }

    async fn build_response(
        &self,
        request: &ItineraryRequest,
        coords: (f64, f64),
        sorted_dates: &[NaiveDate],
        hash: &str,
    ) -> Result<Value, ItineraryError> {
        let mut context = self
            .location_service
            .gather_context(coords, request.radius)
            .await;

        // Reverse-geocoded names join the nearby list so prompts and
        // fallbacks can reference the actual destination
        context.nearby_cities = assemble_nearby_cities(
            context.nearby_cities,
            context.city.clone(),
            context.region.clone(),
        );
        println!("Enhanced location context: {:?}", context.nearby_cities);

        let weather = self
            .weather_service
            .report_for_trip(coords, sorted_dates)
            .await;

        let raw_plan = self
            .llm_service
            .generate_plan(
                &request.destination,
                request.radius,
                sorted_dates,
                &request.preferences,
                &context,
                Some(&weather),
            )
            .await;

        let enriched = self
            .location_service
            .enrich_days(raw_plan, coords, request.radius, &context.nearby_cities)
            .await;

        let mut plan = self.route_optimizer.optimize_route(coords, enriched);
        annotate_dates(&mut plan, sorted_dates);

        let response = ItineraryResponse {
            total_days: sorted_dates.len(),
            plan,
            nearby_cities: context.nearby_cities,
            user_coordinates: Coordinates {
                lat: coords.0,
                lng: coords.1,
            },
            search_radius: request.radius,
            travel_dates: sorted_dates.iter().map(|d| d.to_string()).collect(),
            weather: Some(weather),
            cached: false,
            generated_at: Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_value(&response)
            .map_err(|e| ItineraryError::Internal(e.to_string()))?;

        self.cache
            .store(
                hash,
                &request.destination,
                sorted_dates,
                &request.preferences,
                request.radius,
                payload.clone(),
            )
            .await;

        Ok(payload)
    }
}

fn validate_request(request: &ItineraryRequest) -> Result<(f64, f64), ItineraryError> {
    if request.destination.trim().is_empty() {
        return Err(ItineraryError::Validation(
            "Destination must be provided".to_string(),
        ));
    }
    if request.travel_dates.is_empty() {
        return Err(ItineraryError::Validation(
            "At least one travel date must be provided".to_string(),
        ));
    }
    if request.radius == 0 {
        return Err(ItineraryError::Validation(
            "Search radius must be greater than zero".to_string(),
        ));
    }
    request.parse_coordinates().ok_or_else(|| {
        ItineraryError::Validation(
            "Destination must be in 'Lat: <lat>, Lng: <lng>' format".to_string(),
        )
    })
}

/// Merge the fetched nearby cities with the reverse-geocoded city and
/// region names, dropping empty strings and duplicates while preserving
/// first-seen order.
fn assemble_nearby_cities(
    fetched: Vec<String>,
    city: Option<String>,
    region: Option<String>,
) -> Vec<String> {
    let mut cities: Vec<String> = Vec::with_capacity(fetched.len() + 2);
    for name in fetched
        .into_iter()
        .chain([city, region].into_iter().flatten())
    {
        if !name.is_empty() && !cities.contains(&name) {
            cities.push(name);
        }
    }
    cities
}

/// Attach the sorted travel dates to the route-ordered days.
fn annotate_dates(plan: &mut [DayPlan], sorted_dates: &[NaiveDate]) {
    for (day, date) in plan.iter_mut().zip(sorted_dates) {
        day.date = Some(date.to_string());
        day.formatted_date = Some(date.format("%B %d, %Y").to_string());
    }
}

/// Flip the cached flag on a payload served from cache or a coalesced
/// in-flight generation.
fn mark_cached(mut payload: Value) -> Value {
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("cached".to_string(), Value::Bool(true));
    }
    payload
}
