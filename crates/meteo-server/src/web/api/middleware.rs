use crate::auth::{AuthError, Authorized};
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use meteo_common::models::auth::Scope;
use std::marker::PhantomData;
use std::sync::Arc;

/// What a route demands of the bearer token.
pub trait ScopeRequirement: Send + Sync + 'static {
    const SCOPES: &'static [Scope];
    /// Reject disabled accounts with 403
    const REQUIRE_ACTIVE: bool;
}

/// Any valid token for an existing user, disabled or not.
pub struct AnyScope;
/// `me`, active user
pub struct MeScope;
/// `me` + `items`, active user
pub struct ItemsScope;
/// `weather`, active user
pub struct WeatherScope;

impl ScopeRequirement for AnyScope {
    const SCOPES: &'static [Scope] = &[];
    const REQUIRE_ACTIVE: bool = false;
}

impl ScopeRequirement for MeScope {
    const SCOPES: &'static [Scope] = &[Scope::Me];
    const REQUIRE_ACTIVE: bool = true;
}

impl ScopeRequirement for ItemsScope {
    const SCOPES: &'static [Scope] = &[Scope::Me, Scope::Items];
    const REQUIRE_ACTIVE: bool = true;
}

impl ScopeRequirement for WeatherScope {
    const SCOPES: &'static [Scope] = &[Scope::Weather];
    const REQUIRE_ACTIVE: bool = true;
}

/// Extractor that validates a Bearer token against the scopes of `R`.
pub struct AuthUser<R: ScopeRequirement> {
    pub auth: Authorized,
    _requirement: PhantomData<R>,
}

impl<R: ScopeRequirement> AuthUser<R> {
    pub fn username(&self) -> &str {
        &self.auth.user.username
    }
}

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<R: ScopeRequirement> FromRequestParts<Arc<AppState>> for AuthUser<R> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AuthError::InvalidToken {
            required: R::SCOPES.to_vec(),
        })?;

        let auth = state
            .authorizer
            .authorize(token, R::SCOPES, R::REQUIRE_ACTIVE)
            .await?;

        Ok(AuthUser {
            auth,
            _requirement: PhantomData,
        })
    }
}
