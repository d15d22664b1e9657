//! End-to-end tests of the REST API over an in-memory database.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use common::{sample_telemetry, seeded_pool, FixedSource};
use pitline::adapters::http::{build_router, AppState, HttpServer};
use pitline::domain::models::{Config, ServerConfig};

async fn app_with(source: FixedSource) -> Router {
    let config = Config::default();
    let state = AppState::new(seeded_pool().await, &config, Arc::new(source));
    build_router(state, &config.server)
}

async fn app() -> Router {
    app_with(FixedSource::new(sample_telemetry())).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
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
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

async fn bahrain_id(app: &Router) -> i64 {
    let (_, body) = get(app, "/api/v1/races?season=2024").await;
    body["data"]["races"][0]["id"].as_i64().unwrap()
}

async fn driver_id(app: &Router, code: &str) -> i64 {
    let (_, body) = get(app, &format!("/api/v1/drivers?search={code}")).await;
    body["data"]["drivers"][0]["id"].as_i64().unwrap()
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        Some(json!({"email": email, "password": "pit-wall-2024", "password_confirm": "pit-wall-2024"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_liveness_and_health() {
    let app = app().await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = get(&app, "/api/v1/health/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["meta"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_seeded_catalog_is_served() {
    let app = app().await;

    let (status, body) = get(&app, "/api/v1/races?season=2024").await;
    assert_eq!(status, StatusCode::OK);
    let races = body["data"]["races"].as_array().unwrap();
    assert_eq!(races.len(), 24);
    assert_eq!(races[0]["name"], "Bahrain Grand Prix");

    let (_, body) = get(&app, "/api/v1/seasons").await;
    assert_eq!(body["data"]["seasons"][0]["year"], 2024);

    let (status, body) = get(&app, "/api/v1/teams/Ferrari").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["drivers"].as_array().unwrap().len(), 2);

    let (_, body) = get(&app, "/api/v1/circuits?country=Monaco").await;
    assert_eq!(body["data"]["circuits"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_not_found_uses_error_envelope() {
    let app = app().await;

    let (status, body) = get(&app, "/api/v1/races/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"]["error"]["code"], "RACE_NOT_FOUND");

    let (status, body) = get(&app, "/api/v1/teams/Brawn").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"]["error"]["code"], "TEAM_NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_path_is_validation_error() {
    let app = app().await;

    let (status, body) = get(&app, "/api/v1/races/abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"]["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = app().await;
    register(&app, "Engineer@Example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({"email": "engineer@example.com", "password": "pit-wall-2024"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "bearer");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/api/v1/auth/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "engineer@example.com");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = app().await;
    register(&app, "driver@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({"email": "driver@example.com", "password": "box-box-box"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"]["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = app().await;

    let (status, body) = get(&app, "/api/v1/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"]["error"]["code"], "NOT_AUTHENTICATED");

    let (status, _) = send(&app, Method::GET, "/api/v1/auth/me", None, Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_import_then_query_race_data() {
    let app = app().await;
    let race_id = bahrain_id(&app).await;

    let (status, body) = send(&app, Method::POST, "/api/v1/import/race/2024/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["laps"], 30);
    assert_eq!(body["data"]["created_drivers"], 1);

    let (_, body) = get(&app, &format!("/api/v1/races/{race_id}")).await;
    assert_eq!(body["data"]["data_imported"], true);

    let lec = driver_id(&app, "LEC").await;
    let (_, body) = get(&app, &format!("/api/v1/races/{race_id}/laps?driver_id={lec}")).await;
    assert_eq!(body["data"]["lap_data"].as_array().unwrap().len(), 10);

    let (_, body) = get(&app, &format!("/api/v1/races/{race_id}/pit-stops")).await;
    let stops = body["data"]["pit_stops"].as_array().unwrap();
    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0]["lap"], 4);

    let (_, body) = get(&app, &format!("/api/v1/races/{race_id}/results")).await;
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 3);

    let (status, body) = get(&app, &format!("/api/v1/races/{race_id}/fastest-lap")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lap_time_seconds"], 95.0);
}

#[tokio::test]
async fn test_import_failure_is_reported() {
    let app = app_with(FixedSource::unavailable()).await;

    let (status, body) = send(&app, Method::POST, "/api/v1/import/race/2024/1", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"]["error"]["code"], "IMPORT_FAILED");
}

#[tokio::test]
async fn test_strategy_queries() {
    let app = app().await;
    let race_id = bahrain_id(&app).await;
    send(&app, Method::POST, "/api/v1/import/race/2024/1", None, None).await;
    let ver = driver_id(&app, "VER").await;
    let lec = driver_id(&app, "LEC").await;

    let (status, body) = get(
        &app,
        &format!("/api/v1/simulations/pit-stop?race_id={race_id}&driver_id={lec}&alternative_stop_lap=6"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["original_stop_lap"], 4);
    assert_eq!(body["data"]["alternative_stop_lap"], 6);

    let (status, _) = get(
        &app,
        &format!("/api/v1/simulations/pit-stop?race_id={race_id}&driver_id={lec}&alternative_stop_lap=99"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(
        &app,
        &format!("/api/v1/simulations/defend?race_id={race_id}&driver_id={ver}&attacking_driver_id={lec}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["scenario_name"], "Defense Position");

    let (status, body) = get(
        &app,
        &format!(
            "/api/v1/simulations/weather?race_id={race_id}&driver_id={ver}&current_weather=dry&expected_weather=wet"
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["recommended_compound"], "WET");
}

#[tokio::test]
async fn test_saved_simulations_are_per_user() {
    let app = app().await;
    let race_id = bahrain_id(&app).await;
    send(&app, Method::POST, "/api/v1/import/race/2024/1", None, None).await;
    let lec = driver_id(&app, "LEC").await;
    let token = register(&app, "strategist@example.com").await;
    let other = register(&app, "rival@example.com").await;

    let request = json!({
        "race_id": race_id,
        "driver_id": lec,
        "alternative_stop_lap": 6,
        "alternative_tire_compound": "MEDIUM"
    });

    let (status, _) = send(&app, Method::POST, "/api/v1/simulations", Some(request.clone()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::POST, "/api/v1/simulations", Some(request), Some(&token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["race_id"], race_id);

    let (_, body) = send(&app, Method::GET, "/api/v1/simulations", None, Some(&token)).await;
    assert_eq!(body["data"]["simulations"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/api/v1/simulations", None, Some(&other)).await;
    assert!(body["data"]["simulations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_server_binds_hostnames() {
    let config = Config::default();
    let state = AppState::new(seeded_pool().await, &config, Arc::new(FixedSource::new(sample_telemetry())));
    let server = HttpServer::new(
        state,
        ServerConfig {
            host: "localhost".to_string(),
            port: 0,
            ..config.server.clone()
        },
    );

    let result = server.serve_with_shutdown(async {}).await;
    assert!(result.is_ok(), "serve failed: {result:?}");
}
