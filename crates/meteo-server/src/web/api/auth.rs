use super::middleware::{AnyScope, AuthUser};
use super::Envelope;
use crate::auth::{AuthError, NewAccount};
use crate::error::{ApiError, FieldIssue};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use axum_extra::extract::WithRejection;
use meteo_common::models::auth::{Scope, TokenResponse};
use meteo_common::models::user::User;
use meteo_common::validation::{validate_email, validate_password, validate_username};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub scopes: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

/// OAuth2 password-grant form
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub scope: String,
}

const LOGIN_DEFAULT_SCOPES: &[Scope] = &[Scope::Me, Scope::Items, Scope::Weather];
const TOKEN_DEFAULT_SCOPES: &[Scope] = &[Scope::Me, Scope::Weather];

fn unknown_scope(field: &str, name: &str) -> ApiError {
    ApiError::Validation(vec![FieldIssue {
        field: field.to_string(),
        message: format!("Unknown scope '{}'", name),
        kind: "value_error".to_string(),
    }])
}

fn parse_scope_names(names: &[String]) -> Result<Vec<Scope>, ApiError> {
    let mut scopes = Vec::new();
    for name in names {
        let scope: Scope = name.parse().map_err(|_| unknown_scope("scopes", name))?;
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    Ok(scopes)
}

fn parse_scope_field(raw: &str) -> Result<Vec<Scope>, ApiError> {
    Scope::parse_list(raw).map_err(|e| unknown_scope("scope", &e.0))
}

/// POST /signup
#[tracing::instrument(skip(state, req))]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): WithRejection<Json<SignupRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let account = NewAccount {
        username: validate_username(&req.username)?,
        email: validate_email(&req.email)?,
        password: {
            validate_password(&req.password)?;
            req.password
        },
        full_name: req
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    };

    let user = state.authenticator.create_user(account).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::with_message(user.to_user(), "User registered successfully"),
    ))
}

/// POST /login -- JSON login returning the token and the user
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Envelope<LoginResponse>, ApiError> {
    let scopes = match &req.scopes {
        Some(names) => parse_scope_names(names)?,
        None => LOGIN_DEFAULT_SCOPES.to_vec(),
    };

    let user = state
        .authenticator
        .authenticate(&req.username, &req.password)
        .await?;
    if user.disabled {
        return Err(AuthError::AccountDisabled.into());
    }

    let access_token = state.authenticator.issue_token(&user.username, &scopes)?;
    tracing::info!("User '{}' logged in", user.username);

    Ok(Envelope::with_message(
        LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: state.authenticator.token_ttl().num_seconds(),
            user: user.to_user(),
        },
        "Login successful",
    ))
}

/// POST /login/form -- OAuth2 form login, bare token document
#[tracing::instrument(skip(state, form))]
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    WithRejection(Form(form), _): WithRejection<Form<PasswordForm>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let scopes = parse_scope_field(&form.scope)?;
    let user = state
        .authenticator
        .authenticate(&form.username, &form.password)
        .await?;
    if user.disabled {
        return Err(AuthError::AccountDisabled.into());
    }

    let access_token = state.authenticator.issue_token(&user.username, &scopes)?;
    Ok(Json(TokenResponse::bearer(access_token)))
}

/// POST /token -- OAuth2 token endpoint
#[tracing::instrument(skip(state, form))]
pub async fn token(
    State(state): State<Arc<AppState>>,
    WithRejection(Form(form), _): WithRejection<Form<PasswordForm>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let mut scopes = parse_scope_field(&form.scope)?;
    if scopes.is_empty() {
        scopes = TOKEN_DEFAULT_SCOPES.to_vec();
    }

    let user = state
        .authenticator
        .authenticate(&form.username, &form.password)
        .await?;
    let access_token = state.authenticator.issue_token(&user.username, &scopes)?;
    Ok(Json(TokenResponse::bearer(access_token)))
}

/// POST /logout -- tokens are stateless; the client discards its copy
pub async fn logout(user: AuthUser<AnyScope>) -> Envelope<serde_json::Value> {
    Envelope::with_message(
        json!({ "username": user.username() }),
        "Logged out. Discard the token on the client.",
    )
}

/// POST /logout/all
pub async fn logout_all(user: AuthUser<AnyScope>) -> Envelope<serde_json::Value> {
    Envelope::with_message(
        json!({ "username": user.username() }),
        "Logged out on all devices. Issued tokens stay valid until they expire.",
    )
}

/// GET /session
pub async fn session(user: AuthUser<AnyScope>) -> Envelope<serde_json::Value> {
    let auth = &user.auth;
    let mut scopes = auth.scopes.clone();
    scopes.sort();
    Envelope::with_message(
        json!({
            "username": auth.user.username,
            "email": auth.user.email,
            "full_name": auth.user.full_name,
            "is_active": !auth.user.disabled,
            "scopes": scopes,
            "issued_at": auth.issued_at,
            "expires_at": auth.expires_at,
        }),
        "Session is active",
    )
}
