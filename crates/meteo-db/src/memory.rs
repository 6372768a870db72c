use crate::repos::user::{NewUser, UserRow, UserUpdate};
use crate::repos::weather::{NewWeatherRecord, WeatherRecordRow};
use crate::store::{StoreError, StoreResult, UserStore, WeatherHistoryStore};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use meteo_common::models::weather::WeatherStats;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process store used when no database is configured, and in tests.
/// State is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRow>>,
    history: RwLock<Vec<WeatherRecordRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with an explicit capture time
    pub async fn save_weather_at(
        &self,
        record: NewWeatherRecord,
        captured_at: DateTime<Utc>,
    ) -> WeatherRecordRow {
        let row = WeatherRecordRow {
            record_id: Uuid::new_v4(),
            city: record.city,
            forecast_type: record.forecast_type.as_str().to_string(),
            temperature: record.temperature,
            data: record.data,
            captured_at,
        };
        self.history.write().await.push(row.clone());
        row
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRow> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::DuplicateUsername);
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let row = UserRow {
            user_id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            full_name: user.full_name,
            disabled: user.disabled,
            created_at: now,
            updated_at: now,
        };
        users.insert(row.username.clone(), row.clone());
        Ok(row)
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        Ok(self.users.read().await.contains_key(username))
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }

    async fn update_user(
        &self,
        username: &str,
        update: UserUpdate,
    ) -> StoreResult<Option<UserRow>> {
        let mut users = self.users.write().await;
        if let Some(email) = &update.email {
            if users
                .values()
                .any(|u| u.username != username && &u.email == email)
            {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(row) = users.get_mut(username) else {
            return Ok(None);
        };
        if let Some(email) = update.email {
            row.email = email;
        }
        if let Some(full_name) = update.full_name {
            row.full_name = Some(full_name);
        }
        if let Some(hash) = update.password_hash {
            row.password_hash = hash;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

#[async_trait]
impl WeatherHistoryStore for MemoryStore {
    async fn save_weather(&self, record: NewWeatherRecord) -> StoreResult<WeatherRecordRow> {
        Ok(self.save_weather_at(record, Utc::now()).await)
    }

    async fn weather_by_city(&self, city: &str, limit: i64) -> StoreResult<Vec<WeatherRecordRow>> {
        let city = city.to_lowercase();
        let history = self.history.read().await;
        let mut rows: Vec<WeatherRecordRow> = history
            .iter()
            .filter(|r| r.city.to_lowercase() == city)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn cities_with_data(&self) -> StoreResult<Vec<String>> {
        let history = self.history.read().await;
        let cities: BTreeSet<String> = history.iter().map(|r| r.city.clone()).collect();
        Ok(cities.into_iter().collect())
    }

    async fn weather_stats(&self, city: &str, days: i64) -> StoreResult<WeatherStats> {
        let since = Utc::now() - Duration::days(days);
        let needle = city.to_lowercase();
        let history = self.history.read().await;

        let matching: Vec<&WeatherRecordRow> = history
            .iter()
            .filter(|r| r.city.to_lowercase() == needle && r.captured_at >= since)
            .collect();
        let temps: Vec<f64> = matching.iter().filter_map(|r| r.temperature).collect();

        let avg = (!temps.is_empty()).then(|| temps.iter().sum::<f64>() / temps.len() as f64);
        let min = temps.iter().copied().reduce(f64::min);
        let max = temps.iter().copied().reduce(f64::max);

        Ok(WeatherStats {
            city: city.to_string(),
            avg_temperature: avg,
            min_temperature: min,
            max_temperature: max,
            records_count: matching.len() as i64,
            period_days: days,
        })
    }

    async fn purge_weather_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let mut history = self.history.write().await;
        let before = history.len();
        history.retain(|r| r.captured_at >= cutoff);
        Ok((before - history.len()) as u64)
    }
}
