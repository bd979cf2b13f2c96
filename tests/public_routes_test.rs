mod common;

use actix_web::test;
use serde_json::{json, Value};
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn health_check_responds_ok() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
}

#[actix_rt::test]
#[serial]
async fn register_rejects_invalid_email() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "email": "not-an-email",
            "password": "supersecret1",
            "password2": "supersecret1",
            "full_name": "Test Traveler"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn register_rejects_mismatched_passwords() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "email": "traveler@example.com",
            "password": "supersecret1",
            "password2": "different1",
            "full_name": "Test Traveler"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Passwords do not match");
}

#[actix_rt::test]
#[serial]
async fn register_rejects_short_password() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "email": "traveler@example.com",
            "password": "short",
            "password2": "short",
            "full_name": "Test Traveler"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn plan_requires_a_destination() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/plan")
        .set_json(&json!({
            "destination": "   ",
            "searchMode": "quick"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn plan_rejects_payload_without_search_mode() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/plan")
        .set_json(&json!({"destination": "Kyoto"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn place_details_requires_query() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/place-details").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::get()
        .uri("/api/place-details?query=%20%20")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn replace_activity_validates_indices() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let plan = json!({
        "summary": "s",
        "days": [{"title": "Day 1", "activities": [{"time": "09:00", "description": "Walk"}]}]
    });

    let req = test::TestRequest::post()
        .uri("/api/chat/replace-activity")
        .set_json(&json!({
            "message": "something else",
            "dayIndex": 5,
            "activityIndex": 0,
            "plan": plan
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::post()
        .uri("/api/chat/replace-activity")
        .set_json(&json!({
            "message": "something else",
            "dayIndex": 0,
            "activityIndex": 9,
            "plan": json!({
                "summary": "s",
                "days": [{"title": "Day 1", "activities": []}]
            })
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn google_callback_reports_denied_consent() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    // Google redirects back with only error and state when the user
    // declines consent; no authorization code is present.
    let req = test::TestRequest::get()
        .uri("/api/auth/google/callback?error=access_denied&state=xyz")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("OAuth error: access_denied"));
}

#[actix_rt::test]
#[serial]
async fn google_callback_requires_an_authorization_code() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/auth/google/callback?state=xyz")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("missing authorization code"));
}

#[actix_rt::test]
#[serial]
async fn password_reset_confirm_rejects_bad_link() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/password-reset/confirm/not-an-object-id/sometoken")
        .set_json(&json!({
            "password": "newpassword1",
            "password2": "newpassword1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
}
