//! Storage seams used by the server. `PgStore` is backed by PostgreSQL;
//! [`crate::MemoryStore`] keeps everything in process.

use crate::repos::user::{NewUser, UserRepo, UserRow, UserUpdate};
use crate::repos::weather::{NewWeatherRecord, WeatherRecordRow, WeatherRepo};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use meteo_common::models::weather::WeatherStats;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already registered")]
    DuplicateUsername,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow>;
    async fn get_user(&self, username: &str) -> StoreResult<Option<UserRow>>;
    async fn username_exists(&self, username: &str) -> StoreResult<bool>;
    async fn email_exists(&self, email: &str) -> StoreResult<bool>;
    /// Returns `None` when the user does not exist
    async fn update_user(&self, username: &str, update: UserUpdate)
        -> StoreResult<Option<UserRow>>;
}

#[async_trait]
pub trait WeatherHistoryStore: Send + Sync {
    async fn save_weather(&self, record: NewWeatherRecord) -> StoreResult<WeatherRecordRow>;
    /// Newest first, matched case-insensitively on city
    async fn weather_by_city(&self, city: &str, limit: i64) -> StoreResult<Vec<WeatherRecordRow>>;
    async fn cities_with_data(&self) -> StoreResult<Vec<String>>;
    async fn weather_stats(&self, city: &str, days: i64) -> StoreResult<WeatherStats>;
    async fn purge_weather_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        UserRepo::create(&self.pool, &user).await
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(UserRepo::get_by_username(&self.pool, username).await?)
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        Ok(UserRepo::username_exists(&self.pool, username).await?)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(UserRepo::email_exists(&self.pool, email).await?)
    }

    async fn update_user(
        &self,
        username: &str,
        update: UserUpdate,
    ) -> StoreResult<Option<UserRow>> {
        UserRepo::update(&self.pool, username, &update).await
    }
}

#[async_trait]
impl WeatherHistoryStore for PgStore {
    async fn save_weather(&self, record: NewWeatherRecord) -> StoreResult<WeatherRecordRow> {
        Ok(WeatherRepo::insert(&self.pool, &record).await?)
    }

    async fn weather_by_city(&self, city: &str, limit: i64) -> StoreResult<Vec<WeatherRecordRow>> {
        Ok(WeatherRepo::list_by_city(&self.pool, city, limit).await?)
    }

    async fn cities_with_data(&self) -> StoreResult<Vec<String>> {
        Ok(WeatherRepo::list_cities(&self.pool).await?)
    }

    async fn weather_stats(&self, city: &str, days: i64) -> StoreResult<WeatherStats> {
        let since = Utc::now() - Duration::days(days);
        let summary = WeatherRepo::summarize(&self.pool, city, since).await?;
        Ok(WeatherStats {
            city: city.to_string(),
            avg_temperature: summary.avg,
            min_temperature: summary.min,
            max_temperature: summary.max,
            records_count: summary.count,
            period_days: days,
        })
    }

    async fn purge_weather_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        Ok(WeatherRepo::delete_older_than(&self.pool, cutoff).await?)
    }
}
