pub mod api;

use crate::error::{stamp_error_path, ApiError};
use crate::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderName, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::build_api_routes(state.clone()))
        .fallback(api::not_found)
        .layer(middleware::from_fn_with_state(state, rate_limit))
        .layer(middleware::from_fn(stamp_error_path))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=120; includeSubDomains"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Client identifier for rate limiting: the peer IP when the server was
/// started with connect info, otherwise a shared bucket.
fn client_id(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Sliding-window admission gate in front of every non-excluded route.
async fn rate_limit(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let config = &state.config.rate_limit;
    let path = req.uri().path().to_string();
    if !config.enabled || config.excluded_paths.iter().any(|p| *p == path) {
        return next.run(req).await;
    }

    let client = client_id(&req);
    let decision = state.rate_limiter.check(&client);
    let reset_secs =
        decision.reset_after.as_secs() + u64::from(decision.reset_after.subsec_nanos() > 0);

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!("Rate limit exceeded for client {} on {}", client, path);
        let mut response = ApiError::RateLimited.into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(reset_secs));
        response
    };

    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-reset"),
        HeaderValue::from(Utc::now().timestamp() + reset_secs as i64),
    );
    response
}
