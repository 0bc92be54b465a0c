use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use travel_planner_api::db;
use travel_planner_api::routes;
use travel_planner_api::services::cache_service::CacheService;
use travel_planner_api::services::itinerary_service::ItineraryService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    // MongoDB is optional: without it the cache is in-memory only
    let mongo_client = match std::env::var("MONGODB_URI") {
        Ok(uri) => db::mongo::create_mongo_client(&uri).await,
        Err(_) => {
            println!("MONGODB_URI not set, running without persistent cache");
            None
        }
    };

    let cache = Arc::new(CacheService::new(mongo_client.clone()));
    let itinerary_service = Arc::new(ItineraryService::new(Arc::clone(&cache)));

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(mongo_client.clone()))
            .app_data(web::Data::new(Arc::clone(&cache)))
            .app_data(web::Data::new(Arc::clone(&itinerary_service)))
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
    })
    .bind((host, port))?
    .run()
    .await
}
