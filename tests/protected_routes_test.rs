mod common;

use actix_web::{http::header, test};
use serde_json::{json, Value};
use serial_test::serial;

use common::{make_token, TestApp};

#[actix_rt::test]
#[serial]
async fn protected_routes_require_a_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for uri in [
        "/api/my-trips",
        "/api/profile",
        "/api/auth/session",
        "/api/activity-notes/000000000000000000000000",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::try_call_service(&app, req).await;
        match resp {
            Ok(resp) => assert_eq!(resp.status(), 401, "expected 401 for {}", uri),
            Err(err) => assert_eq!(err.as_response_error().status_code(), 401),
        }
    }
}

#[actix_rt::test]
#[serial]
async fn save_trip_requires_a_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/trips/save")
        .set_json(&json!({
            "destination": "Kyoto",
            "planJson": {"days": [], "summary": "s"}
        }))
        .to_request();

    match test::try_call_service(&app, req).await {
        Ok(resp) => assert_eq!(resp.status(), 401),
        Err(err) => assert_eq!(err.as_response_error().status_code(), 401),
    }
}

#[actix_rt::test]
#[serial]
async fn garbage_token_is_rejected() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
        .to_request();

    match test::try_call_service(&app, req).await {
        Ok(resp) => assert_eq!(resp.status(), 401),
        Err(err) => assert_eq!(err.as_response_error().status_code(), 401),
    }
}

#[actix_rt::test]
#[serial]
async fn valid_token_passes_the_middleware() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = make_token("traveler@example.com");
    let req = test::TestRequest::get()
        .uri("/api/whoami")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "traveler@example.com");
}

#[actix_rt::test]
#[serial]
async fn save_note_rejects_malformed_trip_id() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = make_token("traveler@example.com");
    let req = test::TestRequest::post()
        .uri("/api/activity-note")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_json(&json!({
            "tripId": "not-an-object-id",
            "dayIndex": 0,
            "activityIndex": 0,
            "note": "bring comfortable shoes"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn save_note_rejects_negative_indices() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = make_token("traveler@example.com");
    let req = test::TestRequest::post()
        .uri("/api/activity-note")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .set_json(&json!({
            "tripId": "507f1f77bcf86cd799439011",
            "dayIndex": -1,
            "activityIndex": 0,
            "note": "n"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}
