//! Endpoint tests through the real router against an in-memory database.
//!
//! These cover the boundary behavior the repository tests cannot: status
//! codes, bearer-token enforcement, and the exact response shapes.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use api::AppState;
use auth::JwtManager;
use vin::VinDecoder;

async fn test_app() -> Router {
    let pool = db::pool::open_in_memory().await.unwrap();
    let state = AppState {
        pool,
        jwt: JwtManager::new(b"test-secret", 3600),
        vin: VinDecoder::new(),
    };
    api::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Register a user and return their access token.
async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_vehicle(app: &Router, token: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/vehicles",
        Some(token),
        Some(json!({ "nickname": "daily" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["vehicle"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn register_login_and_profile_flow() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": "Alice@Example.com",
            "password": "hunter2",
            "first_name": "Alice"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // Email is normalized to lowercase and the hash never leaves the server.
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["first_name"], "Alice");
}

#[tokio::test]
async fn duplicate_registration_conflicts_case_insensitively() {
    let app = test_app().await;
    register(&app, "alice@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": "ALICE@example.com", "password": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app().await;
    register(&app, "alice@example.com").await;

    let (wrong_password_status, wrong_password_body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "nope" })),
    )
    .await;
    let (unknown_email_status, unknown_email_body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "hunter2" })),
    )
    .await;

    assert_eq!(wrong_password_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[tokio::test]
async fn missing_or_garbage_token_is_unauthorized() {
    let app = test_app().await;

    let (status, _) = send(&app, "GET", "/vehicles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/vehicles", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn vehicle_crud_stays_within_the_owner() {
    let app = test_app().await;
    let alice = register(&app, "alice@example.com").await;
    let mallory = register(&app, "mallory@example.com").await;

    let vehicle_id = create_vehicle(&app, &alice).await;

    // The owner sees it.
    let (status, body) = send(&app, "GET", &format!("/vehicles/{vehicle_id}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicle"]["nickname"], "daily");

    // Anyone else gets the same 404 a missing id would give.
    let (status, _) = send(&app, "GET", &format!("/vehicles/{vehicle_id}"), Some(&mallory), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/vehicles/{vehicle_id}"),
        Some(&mallory),
        Some(json!({ "nickname": "mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/vehicles/{vehicle_id}"), Some(&mallory), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // And the owner's list contains exactly the untouched vehicle.
    let (status, body) = send(&app, "GET", "/vehicles", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vehicles"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn short_vin_is_rejected() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/vehicles",
        Some(&token),
        Some(json!({ "vin": "TOOSHORT" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "vin must be exactly 17 characters.");
}

#[tokio::test]
async fn service_record_round_trip_via_http() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;
    let vehicle_id = create_vehicle(&app, &token).await;

    let (status, body) = send(
        &app,
        "POST",
        "/service-records",
        Some(&token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "title": "Timing belt",
            "service_date": "2024-03-15",
            "mileage": 45210,
            "cost": 129.99
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = body["service_record"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/service-records/{record_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let record = &body["service_record"];
    assert_eq!(record["service_date"], "2024-03-15");
    assert_eq!(record["mileage"], 45210);
    assert_eq!(record["cost"], 129.99);
}

#[tokio::test]
async fn service_record_create_validations() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;
    let vehicle_id = create_vehicle(&app, &token).await;

    let (status, _) = send(
        &app,
        "POST",
        "/service-records",
        Some(&token),
        Some(json!({ "vehicle_id": vehicle_id, "title": "No date" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/service-records",
        Some(&token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "title": "Bad date",
            "service_date": "15/03/2024"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "service_date must be YYYY-MM-DD.");

    let (status, _) = send(
        &app,
        "POST",
        "/service-records",
        Some(&token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "title": "Bad mileage",
            "service_date": "2024-03-15",
            "mileage": -1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Creating under a nonexistent vehicle is a 404, not a validation error.
    let (status, _) = send(
        &app,
        "POST",
        "/service-records",
        Some(&token),
        Some(json!({
            "vehicle_id": 9999,
            "title": "Ghost vehicle",
            "service_date": "2024-03-15"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reminder_requires_a_due_field() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;
    let vehicle_id = create_vehicle(&app, &token).await;

    let (status, body) = send(
        &app,
        "POST",
        "/reminders",
        Some(&token),
        Some(json!({ "vehicle_id": vehicle_id, "title": "Oil change" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Provide due_date or due_mileage.");

    let (status, body) = send(
        &app,
        "POST",
        "/reminders",
        Some(&token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "title": "Oil change",
            "due_mileage": 5000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reminder"]["due_mileage"], 5000);
    assert_eq!(body["reminder"]["is_completed"], false);
}

#[tokio::test]
async fn moving_a_reminder_across_owners_is_not_found() {
    let app = test_app().await;
    let alice = register(&app, "alice@example.com").await;
    let mallory = register(&app, "mallory@example.com").await;
    let alice_vehicle = create_vehicle(&app, &alice).await;
    let mallory_vehicle = create_vehicle(&app, &mallory).await;

    let (_, body) = send(
        &app,
        "POST",
        "/reminders",
        Some(&alice),
        Some(json!({
            "vehicle_id": alice_vehicle,
            "title": "Registration",
            "due_date": "2025-06-01"
        })),
    )
    .await;
    let reminder_id = body["reminder"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/reminders/{reminder_id}"),
        Some(&alice),
        Some(json!({ "vehicle_id": mallory_vehicle })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "New vehicle not found.");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/reminders/{reminder_id}"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["reminder"]["vehicle_id"], alice_vehicle);
}

#[tokio::test]
async fn update_distinguishes_absent_keys_from_explicit_nulls() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;
    let vehicle_id = create_vehicle(&app, &token).await;

    let (_, body) = send(
        &app,
        "POST",
        "/service-records",
        Some(&token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "title": "Alignment",
            "category": "Tires",
            "service_date": "2024-02-14",
            "notes": "front end pulls left"
        })),
    )
    .await;
    let record_id = body["service_record"]["id"].as_i64().unwrap();

    // notes absent (unchanged), category present-empty (cleared)
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/service-records/{record_id}"),
        Some(&token),
        Some(json!({ "category": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let record = &body["service_record"];
    assert_eq!(record["category"], Value::Null);
    assert_eq!(record["notes"], "front end pulls left");
    assert_eq!(record["title"], "Alignment");
}

#[tokio::test]
async fn completed_filter_narrows_reminder_list() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;
    let vehicle_id = create_vehicle(&app, &token).await;

    let (_, body) = send(
        &app,
        "POST",
        "/reminders",
        Some(&token),
        Some(json!({ "vehicle_id": vehicle_id, "title": "Open", "due_mileage": 1000 })),
    )
    .await;
    let open_id = body["reminder"]["id"].as_i64().unwrap();
    let (_, body) = send(
        &app,
        "POST",
        "/reminders",
        Some(&token),
        Some(json!({ "vehicle_id": vehicle_id, "title": "Done", "due_mileage": 2000 })),
    )
    .await;
    let done_id = body["reminder"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/reminders/{done_id}"),
        Some(&token),
        Some(json!({ "is_completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/reminders?completed=TRUE", Some(&token), None).await;
    let listed = body["reminders"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], done_id);

    let (_, body) = send(&app, "GET", "/reminders?completed=false", Some(&token), None).await;
    let listed = body["reminders"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], open_id);
}

#[tokio::test]
async fn deleting_vehicle_removes_children_via_http() {
    let app = test_app().await;
    let token = register(&app, "alice@example.com").await;
    let vehicle_id = create_vehicle(&app, &token).await;

    let (_, body) = send(
        &app,
        "POST",
        "/service-records",
        Some(&token),
        Some(json!({
            "vehicle_id": vehicle_id,
            "title": "Brakes",
            "service_date": "2024-05-01"
        })),
    )
    .await;
    let record_id = body["service_record"]["id"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/vehicles/{vehicle_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/service-records/{record_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
