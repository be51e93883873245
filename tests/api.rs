use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use habitarc_stats::{build_router, config::Config, AppState};

/// Router backed by a lazy pool that is never contacted by these routes.
fn app() -> Router {
    let config = Config {
        database_url: "postgres://habitarc@localhost:5432/habitarc_test".into(),
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
        db_max_connections: 1,
    };
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .unwrap();

    build_router(AppState {
        db,
        config: Arc::new(config),
    })
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn binary_daily_habit() -> Value {
    json!({
        "id": "7f6c3c1e-2b1a-4d5e-9f00-000000000001",
        "completion_type": "binary",
        "schedule": { "type": "daily" },
        "start_date": "2024-01-01"
    })
}

fn log(date: &str) -> Value {
    json!({
        "habit_id": "7f6c3c1e-2b1a-4d5e-9f00-000000000001",
        "date": date
    })
}

#[tokio::test]
async fn test_health_check() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "habitarc-stats");
}

#[tokio::test]
async fn test_evaluate_stats_end_to_end() {
    let logs: Vec<Value> = [
        "2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-07",
        "2024-01-08", "2024-01-09", "2024-01-10",
    ]
    .into_iter()
    .map(log)
    .collect();

    let (status, json) = post_json(
        "/api/evaluate/stats",
        json!({ "habit": binary_daily_habit(), "logs": logs, "today": "2024-01-10" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["best_streak"], 5);
    assert_eq!(json["current_streak"], 4);
    assert_eq!(json["days_completed"], 9);
    assert_eq!(json["scheduled_days"], 10);
    assert_eq!(json["completion_rate"], 90.0);
}

#[tokio::test]
async fn test_evaluate_stats_rejects_start_after_end() {
    let mut habit = binary_daily_habit();
    habit["end_date"] = json!("2023-12-01");

    let (status, json) = post_json(
        "/api/evaluate/stats",
        json!({ "habit": habit, "logs": [], "today": "2024-01-10" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], 422);
}

#[tokio::test]
async fn test_evaluate_status_count_partial() {
    let habit = json!({
        "id": "7f6c3c1e-2b1a-4d5e-9f00-000000000002",
        "completion_type": "count",
        "daily_target": 10.0,
        "daily_target_comparison": "greater_or_equal",
        "schedule": { "type": "specific_days", "days_of_week": [1, 3, 5] },
        "start_date": "2024-01-01"
    });
    let log = json!({
        "habit_id": "7f6c3c1e-2b1a-4d5e-9f00-000000000002",
        "date": "2024-01-03",
        "value": 5.0
    });

    let (status, json) = post_json(
        "/api/evaluate/status",
        json!({ "habit": habit, "log": log, "date": "2024-01-03" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["date"], "2024-01-03");
    assert_eq!(json["scheduled"], true);
    assert_eq!(json["status"], "partial");
    assert_eq!(json["progress"], 0.5);
    assert_eq!(json["is_complete"], false);
}

#[tokio::test]
async fn test_evaluate_status_without_log_is_none() {
    let (status, json) = post_json(
        "/api/evaluate/status",
        json!({ "habit": binary_daily_habit(), "date": "2023-12-31" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["scheduled"], false);
    assert_eq!(json["status"], "none");
    assert_eq!(json["progress"], 0.0);
}

#[tokio::test]
async fn test_evaluate_rejects_unknown_schedule() {
    let mut habit = binary_daily_habit();
    habit["schedule"] = json!({ "type": "fortnightly" });

    let (status, _) = post_json(
        "/api/evaluate/stats",
        json!({ "habit": habit, "today": "2024-01-10" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_evaluate_status_rejects_log_for_other_day() {
    let (status, json) = post_json(
        "/api/evaluate/status",
        json!({ "habit": binary_daily_habit(), "log": log("2024-01-02"), "date": "2024-01-03" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], 422);
}

#[tokio::test]
async fn test_evaluate_stats_rejects_oversized_span() {
    let mut habit = binary_daily_habit();
    habit["start_date"] = json!("1000-01-01");

    let (status, _) = post_json(
        "/api/evaluate/stats",
        json!({ "habit": habit, "today": "9000-01-01" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
