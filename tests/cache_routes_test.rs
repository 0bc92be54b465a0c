mod common;

use actix_web::test;
use chrono::NaiveDate;
use serde_json::json;
use serial_test::serial;

use common::TestApp;
use travel_planner_api::models::requests::Preferences;
use travel_planner_api::services::cache_service::CacheService;

#[actix_rt::test]
#[serial]
async fn test_cache_stats_starts_empty() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/cache/stats").to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["memory_entries"], 0);
    // No MongoDB in the fixture, so no mongodb_* fields at all
    assert!(body.get("mongodb_total_entries").is_none());
}

#[actix_rt::test]
#[serial]
async fn test_cache_clear_reports_removed_entries() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let dates = vec![NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()];
    let preferences = Preferences::default();
    let hash = CacheService::request_hash("Lat: 52.0, Lng: 21.0", &dates, &preferences, 50);
    test_app
        .cache
        .store(
            &hash,
            "Lat: 52.0, Lng: 21.0",
            &dates,
            &preferences,
            50,
            json!({"plan": []}),
        )
        .await;

    let req = test::TestRequest::get().uri("/cache/stats").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["memory_entries"], 1);

    let req = test::TestRequest::delete().uri("/cache/clear").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["removed_entries"], 1);

    let req = test::TestRequest::get().uri("/cache/stats").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["memory_entries"], 0);
}

#[actix_rt::test]
#[serial]
async fn test_cache_cleanup_ignores_live_entries() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let dates = vec![NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()];
    let preferences = Preferences::default();
    let hash = CacheService::request_hash("Lat: 52.0, Lng: 21.0", &dates, &preferences, 50);
    test_app
        .cache
        .store(
            &hash,
            "Lat: 52.0, Lng: 21.0",
            &dates,
            &preferences,
            50,
            json!({"plan": []}),
        )
        .await;

    let req = test::TestRequest::post().uri("/cache/cleanup").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["removed_entries"], 0);

    let req = test::TestRequest::get().uri("/cache/stats").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["memory_entries"], 1);
}
