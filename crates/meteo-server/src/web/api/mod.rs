pub mod auth;
pub mod middleware;
pub mod users;
pub mod weather;

use crate::error::ApiError;
use crate::state::AppState;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Success envelope: `{"success": true, "data": ..., "message"?: ...}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// GET / -- service info
async fn root() -> Envelope<serde_json::Value> {
    Envelope::ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health -- liveness
async fn health() -> Envelope<serde_json::Value> {
    Envelope::ok(json!({ "status": "ok" }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}

pub fn build_api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Authentication
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/login/form", post(auth::login_form))
        .route("/token", post(auth::token))
        .route("/logout", post(auth::logout))
        .route("/logout/all", post(auth::logout_all))
        .route("/session", get(auth::session))
        // Users
        .route("/users/me", get(users::read_me).patch(users::update_me))
        .route("/users/me/items", get(users::read_items))
        .route("/users/status", get(users::status))
        // Weather
        .route("/coordinates", get(weather::coordinates))
        .route("/weather/current", get(weather::current))
        .route("/weather/hourly-12", get(weather::hourly_12))
        .route("/weather/tomorrow", get(weather::tomorrow))
        .route("/weather/forecast-3days", get(weather::forecast_3days))
        .route("/weather/forecast-7days", get(weather::forecast_7days))
        .route("/weather/history", get(weather::history))
        .route("/weather/cities", get(weather::cities))
        .route("/weather/stats", get(weather::stats))
        .with_state(state)
}
