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
async fn test_generate_itinerary_rejects_missing_fields() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/generate-itinerary")
        .set_json(&json!({
            "destination": "Lat: 52.2297, Lng: 21.0122"
            // Missing travel_dates, preferences, radius
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_generate_itinerary_rejects_empty_dates() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/generate-itinerary")
        .set_json(&json!({
            "destination": "Lat: 52.2297, Lng: 21.0122",
            "travel_dates": [],
            "preferences": { "interests": ["history"] },
            "radius": 50
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("travel date"));
}

#[actix_rt::test]
#[serial]
async fn test_generate_itinerary_rejects_free_text_destination() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/generate-itinerary")
        .set_json(&json!({
            "destination": "Warsaw, Poland",
            "travel_dates": ["2025-06-01"],
            "preferences": { "interests": [] },
            "radius": 50
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("Lat:"));
}

#[actix_rt::test]
#[serial]
async fn test_generate_itinerary_rejects_zero_radius() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/generate-itinerary")
        .set_json(&json!({
            "destination": "Lat: 52.2297, Lng: 21.0122",
            "travel_dates": ["2025-06-01"],
            "preferences": { "interests": [] },
            "radius": 0
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_generate_itinerary_serves_cached_payload() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let destination = "Lat: 52.2297, Lng: 21.0122";
    let dates = vec![NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()];
    let preferences = Preferences {
        interests: vec!["history".to_string()],
        ..Default::default()
    };

    let hash = CacheService::request_hash(destination, &dates, &preferences, 50);
    test_app
        .cache
        .store(
            &hash,
            destination,
            &dates,
            &preferences,
            50,
            json!({
                "plan": [{"day": 1, "town": "Warsaw", "place": "Old Town", "activities": ["Walk"]}],
                "cached": false
            }),
        )
        .await;

    let req = test::TestRequest::post()
        .uri("/generate-itinerary")
        .set_json(&json!({
            "destination": destination,
            "travel_dates": ["2025-06-01"],
            "preferences": { "interests": ["history"] },
            "radius": 50
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    // second serving of the same request is flagged as cache-origin
    assert_eq!(body["cached"], json!(true));
    assert_eq!(body["plan"][0]["town"], "Warsaw");
}

#[actix_rt::test]
#[serial]
async fn test_generate_itinerary_rejects_malformed_dates() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/generate-itinerary")
        .set_json(&json!({
            "destination": "Lat: 52.2297, Lng: 21.0122",
            "travel_dates": ["June 1st"],
            "preferences": { "interests": [] },
            "radius": 50
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}
