use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use std::sync::Arc;

use travel_planner_api::routes;
use travel_planner_api::services::cache_service::CacheService;
use travel_planner_api::services::itinerary_service::ItineraryService;

/// Test fixture wiring the full route table against an in-memory cache, so
/// no MongoDB instance is needed to exercise the HTTP surface.
pub struct TestApp {
    pub cache: Arc<CacheService>,
    pub itinerary_service: Arc<ItineraryService>,
}

impl TestApp {
    pub fn new() -> Self {
        let cache = Arc::new(CacheService::new(None));
        let itinerary_service = Arc::new(ItineraryService::new(Arc::clone(&cache)));

        Self {
            cache,
            itinerary_service,
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let mongo_client: Option<Arc<mongodb::Client>> = None;

        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .wrap(Logger::default())
            .app_data(web::Data::new(mongo_client))
            .app_data(web::Data::new(Arc::clone(&self.cache)))
            .app_data(web::Data::new(Arc::clone(&self.itinerary_service)))
            .route("/", web::get().to(routes::health::index))
            .route("/health", web::get().to(routes::health::health_check))
            .route(
                "/generate-itinerary",
                web::post().to(routes::itinerary::generate_itinerary),
            )
            .service(
                web::scope("/cache")
                    .route("/stats", web::get().to(routes::cache::stats))
                    .route("/cleanup", web::post().to(routes::cache::cleanup))
                    .route("/clear", web::delete().to(routes::cache::clear)),
            )
    }
}
