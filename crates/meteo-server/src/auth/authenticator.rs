use super::password::{dummy_verify, hash_password_blocking, verify_password_blocking};
use super::token::TokenKeys;
use super::AuthError;
use chrono::Duration;
use meteo_common::models::auth::Scope;
use meteo_db::{NewUser, UserRow, UserStore, UserUpdate};
use std::sync::Arc;

/// Validated signup input; the password is still plain text here.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.password.is_none()
    }
}

/// Credential checks, account creation and token issuance.
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    keys: TokenKeys,
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>, keys: TokenKeys, token_ttl: Duration) -> Self {
        Self {
            users,
            keys,
            token_ttl,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Returns the stored user whether or not it is disabled; callers
    /// decide what a disabled account may do.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserRow, AuthError> {
        let Some(user) = self.users.get_user(username).await? else {
            dummy_verify(password.to_string()).await;
            return Err(AuthError::InvalidCredentials);
        };

        let ok = verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !ok {
            tracing::warn!("Failed login attempt for '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn issue_token(&self, username: &str, scopes: &[Scope]) -> Result<String, AuthError> {
        Ok(self.keys.issue(username, scopes, self.token_ttl)?)
    }

    #[tracing::instrument(skip(self, account), fields(username = %account.username))]
    pub async fn create_user(&self, account: NewAccount) -> Result<UserRow, AuthError> {
        if self.users.username_exists(&account.username).await? {
            return Err(AuthError::DuplicateUsername);
        }
        if self.users.email_exists(&account.email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password_blocking(account.password).await?;
        let user = self
            .users
            .create_user(NewUser {
                username: account.username,
                email: account.email,
                password_hash,
                full_name: account.full_name,
                disabled: false,
            })
            .await?;
        tracing::info!("Registered user '{}'", user.username);
        Ok(user)
    }

    #[tracing::instrument(skip(self, changes))]
    pub async fn update_profile(
        &self,
        username: &str,
        changes: ProfileChanges,
    ) -> Result<UserRow, AuthError> {
        if let Some(email) = &changes.email {
            let current = self
                .users
                .get_user(username)
                .await?
                .ok_or(AuthError::InvalidToken { required: vec![] })?;
            if &current.email != email && self.users.email_exists(email).await? {
                return Err(AuthError::DuplicateEmail);
            }
        }

        let password_hash = match changes.password {
            Some(password) => Some(hash_password_blocking(password).await?),
            None => None,
        };
        let update = UserUpdate {
            email: changes.email,
            full_name: changes.full_name,
            password_hash,
        };

        self.users
            .update_user(username, update)
            .await?
            .ok_or(AuthError::InvalidToken { required: vec![] })
    }
}
