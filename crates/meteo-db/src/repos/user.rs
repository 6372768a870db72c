use crate::store::StoreError;
use anyhow::Context;
use chrono::{DateTime, Utc};
use meteo_common::models::user::User;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "user_id, username, email, password_hash, full_name, disabled, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Client-facing view without the password hash
    pub fn to_user(&self) -> User {
        User {
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            disabled: self.disabled,
        }
    }
}

/// Fields for a new account. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub disabled: bool,
}

/// Profile changes; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password_hash: Option<String>,
}

/// Translate a unique-constraint violation on `users` into the matching
/// duplicate error.
fn map_user_write_error(err: sqlx::Error, context: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some("users_username_key") => return StoreError::DuplicateUsername,
                Some("users_email_key") => return StoreError::DuplicateEmail,
                _ => {}
            }
        }
    }
    StoreError::Backend(anyhow::Error::new(err).context(context))
}

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, user: &NewUser) -> Result<UserRow, StoreError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (user_id, username, email, password_hash, full_name, disabled) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.disabled)
        .fetch_one(pool)
        .await
        .map_err(|e| map_user_write_error(e, "Failed to create user"))
    }

    pub async fn get_by_username(pool: &PgPool, username: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by username")?;
        Ok(row)
    }

    pub async fn username_exists(pool: &PgPool, username: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(pool)
                .await
                .context("Failed to check username")?;
        Ok(exists)
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
            .context("Failed to check email")?;
        Ok(exists)
    }

    pub async fn update(
        pool: &PgPool,
        username: &str,
        update: &UserUpdate,
    ) -> Result<Option<UserRow>, StoreError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                full_name = COALESCE($3, full_name), \
                password_hash = COALESCE($4, password_hash), \
                updated_at = NOW() \
             WHERE username = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(&update.email)
        .bind(&update.full_name)
        .bind(&update.password_hash)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_user_write_error(e, "Failed to update user"))
    }
}
