use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

/*
    GET /
*/
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "travel-planner-api",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/*
    GET /health
*/
pub async fn health_check(client: web::Data<Option<Arc<Client>>>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let mongo_result = check_mongodb(client.get_ref()).await;
    health
        .services
        .insert("mongodb".to_string(), mongo_result.clone());

    health
        .services
        .insert("llm".to_string(), check_llm_config());
    health
        .services
        .insert("geocoding".to_string(), check_geocoding_config());
    health
        .services
        .insert("weather".to_string(), check_weather_config());

    // MongoDB being down only degrades caching, everything else has a
    // documented fallback, so only a hard error flips the overall status
    if mongo_result.status == "error" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_mongodb(client: &Option<Arc<Client>>) -> ServiceStatus {
    let client = match client {
        Some(client) => client,
        None => {
            return ServiceStatus {
                status: "disabled".to_string(),
                details: Some("No MongoDB configured, cache is in-memory only".to_string()),
            }
        }
    };

    match client
        .database("travel_planner")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            eprintln!("MongoDB health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}

fn check_llm_config() -> ServiceStatus {
    let endpoint =
        env::var("LLM_ENDPOINT").unwrap_or("http://localhost:11434/api/generate".to_string());
    let model = env::var("LLM_MODEL").unwrap_or("llama3".to_string());

    ServiceStatus {
        status: "ok".to_string(),
        details: Some(format!("Endpoint: {}, model: {}", endpoint, model)),
    }
}

fn check_geocoding_config() -> ServiceStatus {
    match env::var("GOOGLE_MAPS_API_KEY") {
        Ok(key) if !key.is_empty() => {
            let masked_key = if key.len() > 8 {
                format!("{}***{}", &key[0..4], &key[key.len() - 4..])
            } else {
                "***".to_string()
            };

            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("Google Maps API key configured ({})", masked_key)),
            }
        }
        _ => ServiceStatus {
            status: "disabled".to_string(),
            details: Some(
                "GOOGLE_MAPS_API_KEY not configured, days will be unresolved".to_string(),
            ),
        },
    }
}

fn check_weather_config() -> ServiceStatus {
    match env::var("OPENWEATHER_API_KEY") {
        Ok(key) if !key.is_empty() => ServiceStatus {
            status: "ok".to_string(),
            details: Some("OpenWeatherMap API key configured".to_string()),
        },
        _ => ServiceStatus {
            status: "ok".to_string(),
            details: Some("No OPENWEATHER_API_KEY, using free Open-Meteo API".to_string()),
        },
    }
}
