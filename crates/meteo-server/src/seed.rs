use crate::auth::password::hash_password_blocking;
use crate::config::InitialUserConfig;
use anyhow::{Context, Result};
use meteo_db::{NewUser, StoreError, UserStore};

/// Create the configured accounts that do not exist yet. Returns how many
/// were created.
pub async fn seed_initial_users(users: &dyn UserStore, initial: &[InitialUserConfig]) -> Result<usize> {
    let mut created = 0;
    for user in initial {
        if users
            .username_exists(&user.username)
            .await
            .context("Failed to check for initial user")?
        {
            tracing::info!("Initial user '{}' already exists, skipping seed", user.username);
            continue;
        }

        let password_hash = hash_password_blocking(user.password.clone())
            .await
            .context("Failed to hash initial user password")?;
        let result = users
            .create_user(NewUser {
                username: user.username.clone(),
                email: user.email.trim().to_lowercase(),
                password_hash,
                full_name: user.full_name.clone(),
                disabled: user.disabled,
            })
            .await;

        match result {
            Ok(_) => {
                tracing::info!("Created initial user: {}", user.username);
                created += 1;
            }
            Err(StoreError::DuplicateUsername) | Err(StoreError::DuplicateEmail) => {
                tracing::warn!(
                    "Initial user '{}' conflicts with an existing account, skipping",
                    user.username
                );
            }
            Err(StoreError::Backend(e)) => {
                return Err(e.context(format!("Failed to create initial user '{}'", user.username)))
            }
        }
    }
    Ok(created)
}
