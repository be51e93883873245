//! # HabitArc Stats
//!
//! Habit recurrence and streak engine ([`services`]) plus the HTTP service
//! that feeds it habit definitions and log history from PostgreSQL.

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        // Stateless engine access
        .route(
            "/api/evaluate/stats",
            post(handlers::evaluate::evaluate_stats),
        )
        .route(
            "/api/evaluate/status",
            post(handlers::evaluate::evaluate_status),
        );

    let habit_routes = Router::new()
        .route("/api/habits", get(handlers::habits::list_habits))
        .route("/api/habits/:id/stats", get(handlers::habits::get_stats))
        .route("/api/habits/:id/status", get(handlers::habits::get_status))
        .route(
            "/api/habits/:id/calendar",
            get(handlers::habits::get_calendar),
        )
        .route(
            "/api/habits/:id/logs",
            get(handlers::habit_logs::list_habit_logs).put(handlers::habit_logs::upsert_habit_log),
        );

    let cors = match state.config.frontend_url.parse::<axum::http::HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            tracing::warn!(frontend_url = %state.config.frontend_url, "Invalid FRONTEND_URL, CORS disabled");
            CorsLayer::new()
        }
    }
    .allow_methods([
        axum::http::Method::GET,
        axum::http::Method::POST,
        axum::http::Method::PUT,
        axum::http::Method::OPTIONS,
    ])
    .allow_headers([
        axum::http::header::CONTENT_TYPE,
        axum::http::header::ACCEPT,
    ]);

    Router::new()
        .merge(public_routes)
        .merge(habit_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
