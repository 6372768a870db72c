pub mod authenticator;
pub mod authorizer;
pub mod password;
pub mod token;

pub use authenticator::{Authenticator, NewAccount, ProfileChanges};
pub use authorizer::{Authorized, ScopeAuthorizer};
pub use token::TokenKeys;

use meteo_common::models::auth::Scope;
use meteo_db::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    InvalidToken { required: Vec<Scope> },
    #[error("Not enough permissions")]
    InsufficientScope { required: Vec<Scope> },
    #[error("Inactive user")]
    AccountDisabled,
    #[error("Username already registered")]
    DuplicateUsername,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername => AuthError::DuplicateUsername,
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Backend(e) => AuthError::Internal(e),
        }
    }
}
