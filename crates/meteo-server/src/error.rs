//! HTTP error boundary. Every failure leaves the server as
//! `{"success": false, "error": {"code", "message", "path", "details"?}}`.

use crate::auth::AuthError;
use crate::weather::WeatherError;
use axum::body::Body;
use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meteo_common::models::auth::Scope;
use meteo_common::validation::ValidationError;
use meteo_db::StoreError;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// One entry of a 422 `details` list
#[derive(Debug, Clone, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Data validation error")]
    Validation(Vec<FieldIssue>),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error("{0}")]
    NotFound(String),
    #[error("Too many requests. Please try again later")]
    RateLimited,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidInput(err.0)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(e) => ApiError::Internal(e),
            dup => ApiError::Auth(AuthError::from(dup)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match rejection {
            JsonRejection::JsonDataError(_) => "value_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body_error",
        };
        ApiError::Validation(vec![FieldIssue {
            field: "body".to_string(),
            message: rejection.body_text(),
            kind: kind.to_string(),
        }])
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(vec![FieldIssue {
            field: "query".to_string(),
            message: rejection.body_text(),
            kind: "value_error".to_string(),
        }])
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Validation(vec![FieldIssue {
            field: "body".to_string(),
            message: rejection.body_text(),
            kind: "value_error".to_string(),
        }])
    }
}

/// Error payload carried in response extensions so the path can be filled
/// in by [`stamp_error_path`] once the request URI is known.
#[derive(Debug, Clone)]
pub struct ErrorBody {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl ErrorBody {
    fn to_json(&self, path: &str) -> Value {
        let mut error = json!({
            "code": self.status.as_u16(),
            "message": self.message,
            "path": path,
        });
        if let Some(details) = &self.details {
            error["details"] = details.clone();
        }
        json!({ "success": false, "error": error })
    }
}

fn bearer_challenge(required: &[Scope]) -> HeaderValue {
    let value = if required.is_empty() {
        "Bearer".to_string()
    } else {
        format!("Bearer scope=\"{}\"", Scope::join(required))
    };
    HeaderValue::from_str(&value).unwrap_or(HeaderValue::from_static("Bearer"))
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Auth(e) => match e {
                AuthError::InvalidCredentials
                | AuthError::InvalidToken { .. }
                | AuthError::InsufficientScope { .. } => StatusCode::UNAUTHORIZED,
                AuthError::AccountDisabled => StatusCode::FORBIDDEN,
                AuthError::DuplicateUsername | AuthError::DuplicateEmail => StatusCode::BAD_REQUEST,
                AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Weather(e) => match e {
                WeatherError::CityNotFound(_) | WeatherError::ForecastUnavailable(_) => {
                    StatusCode::NOT_FOUND
                }
                WeatherError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn challenge(&self) -> Option<HeaderValue> {
        match self {
            ApiError::Auth(AuthError::InvalidCredentials) => Some(bearer_challenge(&[])),
            ApiError::Auth(AuthError::InvalidToken { required })
            | ApiError::Auth(AuthError::InsufficientScope { required }) => {
                Some(bearer_challenge(required))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) | ApiError::Auth(AuthError::Internal(e)) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => {
                tracing::warn!("Request failed ({}): {}", status.as_u16(), other);
                other.to_string()
            }
        };
        let details = match &self {
            ApiError::Validation(issues) => serde_json::to_value(issues).ok(),
            _ => None,
        };

        let body = ErrorBody {
            status,
            message,
            details,
        };
        let mut response = (status, Json(body.to_json(""))).into_response();
        if let Some(challenge) = self.challenge() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
        }
        response.extensions_mut().insert(body);
        response
    }
}

/// Middleware that rewrites error envelopes with the request path.
pub async fn stamp_error_path(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    let Some(body) = response.extensions_mut().remove::<ErrorBody>() else {
        return response;
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let bytes = body.to_json(&path).to_string();
    Response::from_parts(parts, Body::from(bytes))
}
