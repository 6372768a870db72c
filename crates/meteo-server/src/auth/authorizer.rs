use super::token::TokenKeys;
use super::AuthError;
use meteo_common::models::auth::Scope;
use meteo_db::{UserRow, UserStore};
use std::sync::Arc;

/// A verified bearer: the resolved user plus what the token granted.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub user: UserRow,
    pub scopes: Vec<String>,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Stateless per-request token validation and scope checks.
#[derive(Clone)]
pub struct ScopeAuthorizer {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
}

impl ScopeAuthorizer {
    pub fn new(users: Arc<dyn UserStore>, keys: TokenKeys) -> Self {
        Self { users, keys }
    }

    /// Verify `token`, resolve its subject and check that every `required`
    /// scope was granted. Signature and expiry failures are reported the
    /// same way so callers cannot tell them apart.
    pub async fn authorize(
        &self,
        token: &str,
        required: &[Scope],
        require_active: bool,
    ) -> Result<Authorized, AuthError> {
        let invalid = || AuthError::InvalidToken {
            required: required.to_vec(),
        };

        let claims = self.keys.verify(token).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            invalid()
        })?;

        let username = match claims.sub.as_deref() {
            Some(sub) if !sub.is_empty() => sub,
            _ => return Err(invalid()),
        };
        let user = self.users.get_user(username).await?.ok_or_else(invalid)?;

        let granted = claims.scopes();
        if let Some(missing) = required.iter().find(|s| !granted.contains(s.as_str())) {
            tracing::warn!("User '{}' lacks scope '{}'", username, missing);
            return Err(AuthError::InsufficientScope {
                required: required.to_vec(),
            });
        }

        if require_active && user.disabled {
            return Err(AuthError::AccountDisabled);
        }

        let scopes = granted.into_iter().map(str::to_string).collect();
        Ok(Authorized {
            user,
            scopes,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
