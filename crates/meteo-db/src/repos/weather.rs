use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use meteo_common::models::weather::ForecastType;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

const RECORD_COLUMNS: &str = "record_id, city, forecast_type, temperature, data, captured_at";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WeatherRecordRow {
    pub record_id: Uuid,
    pub city: String,
    pub forecast_type: String,
    pub temperature: Option<f64>,
    pub data: Value,
    pub captured_at: DateTime<Utc>,
}

/// One normalized weather entry to append to the history
#[derive(Debug, Clone)]
pub struct NewWeatherRecord {
    pub city: String,
    pub forecast_type: ForecastType,
    pub temperature: Option<f64>,
    pub data: Value,
}

/// Aggregates over a city's temperatures
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureSummary {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: i64,
}

pub struct WeatherRepo;

impl WeatherRepo {
    pub async fn insert(pool: &PgPool, record: &NewWeatherRecord) -> Result<WeatherRecordRow> {
        let row = sqlx::query_as::<_, WeatherRecordRow>(&format!(
            "INSERT INTO weather_history (record_id, city, forecast_type, temperature, data) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {RECORD_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&record.city)
        .bind(record.forecast_type.as_str())
        .bind(record.temperature)
        .bind(&record.data)
        .fetch_one(pool)
        .await
        .context("Failed to insert weather record")?;
        Ok(row)
    }

    /// Newest records first; city match is case-insensitive
    pub async fn list_by_city(
        pool: &PgPool,
        city: &str,
        limit: i64,
    ) -> Result<Vec<WeatherRecordRow>> {
        let rows = sqlx::query_as::<_, WeatherRecordRow>(&format!(
            "SELECT {RECORD_COLUMNS} FROM weather_history \
             WHERE LOWER(city) = LOWER($1) \
             ORDER BY captured_at DESC LIMIT $2"
        ))
        .bind(city)
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("Failed to list weather history")?;
        Ok(rows)
    }

    pub async fn list_cities(pool: &PgPool) -> Result<Vec<String>> {
        let cities: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT city FROM weather_history ORDER BY city")
                .fetch_all(pool)
                .await
                .context("Failed to list cities")?;
        Ok(cities)
    }

    pub async fn summarize(
        pool: &PgPool,
        city: &str,
        since: DateTime<Utc>,
    ) -> Result<TemperatureSummary> {
        let (avg, min, max, count): (Option<f64>, Option<f64>, Option<f64>, i64) =
            sqlx::query_as(
                "SELECT AVG(temperature), MIN(temperature), MAX(temperature), COUNT(*) \
                 FROM weather_history \
                 WHERE LOWER(city) = LOWER($1) AND captured_at >= $2",
            )
            .bind(city)
            .bind(since)
            .fetch_one(pool)
            .await
            .context("Failed to compute weather stats")?;
        Ok(TemperatureSummary {
            avg,
            min,
            max,
            count,
        })
    }

    /// Returns the number of records removed
    pub async fn delete_older_than(pool: &PgPool, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM weather_history WHERE captured_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await
            .context("Failed to purge weather history")?;
        Ok(result.rows_affected())
    }
}
