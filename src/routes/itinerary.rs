use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::models::requests::ItineraryRequest;
use crate::services::itinerary_service::{ItineraryError, ItineraryService};

/*
    POST /generate-itinerary
*/
pub async fn generate_itinerary(
    request: web::Json<ItineraryRequest>,
    service: web::Data<Arc<ItineraryService>>,
) -> impl Responder {
    let request = request.into_inner();
    println!(
        "Received itinerary request for '{}' with {} dates",
        request.destination,
        request.travel_dates.len()
    );

    match service.generate_itinerary(&request).await {
        Ok(payload) => HttpResponse::Ok().json(payload),
        Err(ItineraryError::Validation(msg)) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": msg }))
        }
        Err(err) => {
            eprintln!("Failed to generate itinerary: {}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Failed to generate itinerary" }))
        }
    }
}
