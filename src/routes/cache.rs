use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::services::cache_service::CacheService;

/*
    GET /cache/stats
*/
pub async fn stats(cache: web::Data<Arc<CacheService>>) -> impl Responder {
    HttpResponse::Ok().json(cache.stats().await)
}

/*
    POST /cache/cleanup
*/
pub async fn cleanup(cache: web::Data<Arc<CacheService>>) -> impl Responder {
    let removed = cache.sweep_expired().await;
    HttpResponse::Ok().json(serde_json::json!({ "removed_entries": removed }))
}

/*
    DELETE /cache/clear
*/
pub async fn clear(cache: web::Data<Arc<CacheService>>) -> impl Responder {
    let removed = cache.clear().await;
    println!("Cache cleared, {} entries removed", removed);
    HttpResponse::Ok().json(serde_json::json!({ "removed_entries": removed }))
}
