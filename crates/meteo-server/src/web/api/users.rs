use super::middleware::{AnyScope, AuthUser, ItemsScope, MeScope};
use super::Envelope;
use crate::auth::ProfileChanges;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use meteo_common::models::user::User;
use meteo_common::validation::{validate_email, validate_password};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

/// GET /users/me
pub async fn read_me(user: AuthUser<MeScope>) -> Envelope<User> {
    Envelope::ok(user.auth.user.to_user())
}

/// PATCH /users/me
#[tracing::instrument(skip(state, user, req), fields(username = %user.username()))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser<MeScope>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> Result<Envelope<User>, ApiError> {
    let changes = ProfileChanges {
        email: req.email.as_deref().map(validate_email).transpose()?,
        full_name: req.full_name.map(|n| n.trim().to_string()),
        password: match req.password {
            Some(p) => {
                validate_password(&p)?;
                Some(p)
            }
            None => None,
        },
    };
    if changes.is_empty() {
        return Err(ApiError::InvalidInput("No fields to update".to_string()));
    }

    let updated = state
        .authenticator
        .update_profile(user.username(), changes)
        .await?;
    Ok(Envelope::with_message(updated.to_user(), "Profile updated"))
}

/// GET /users/me/items
pub async fn read_items(user: AuthUser<ItemsScope>) -> Envelope<Value> {
    Envelope::ok(json!([{ "item_id": "Foo", "owner": user.username() }]))
}

/// GET /users/status
pub async fn status(user: AuthUser<AnyScope>) -> Envelope<Value> {
    Envelope::ok(json!({ "status": "ok", "user": user.username() }))
}
