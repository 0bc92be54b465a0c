pub mod cache_service;
pub mod inflight;
pub mod itinerary_service;
pub mod llm_service;
pub mod location_service;
pub mod route_optimizer;
pub mod weather_service;
