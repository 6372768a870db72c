use super::client::GoogleWeatherClient;
use super::WeatherError;
use meteo_common::models::provider::{map_current, map_days, map_hours};
use meteo_common::models::weather::{
    Coordinates, CurrentWeather, DailyWeather, ForecastType, HourlyWeather, WeatherStats,
};
use meteo_db::{NewWeatherRecord, StoreError, WeatherHistoryStore, WeatherRecordRow};
use serde::Serialize;
use std::sync::Arc;

const HOURLY_WINDOW: u32 = 12;

/// City-level weather lookups. Every normalized entry is appended to the
/// history store; history failures never fail the lookup.
#[derive(Clone)]
pub struct WeatherService {
    client: GoogleWeatherClient,
    history: Arc<dyn WeatherHistoryStore>,
}

impl WeatherService {
    pub fn new(client: GoogleWeatherClient, history: Arc<dyn WeatherHistoryStore>) -> Self {
        Self { client, history }
    }

    pub async fn resolve_coordinates(&self, city: &str) -> Result<Coordinates, WeatherError> {
        self.client.geocode(city).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn current(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        let coords = self.client.geocode(city).await?;
        let weather = map_current(self.client.current_conditions(coords).await?);
        self.record(city, ForecastType::Current, Some(weather.temperature), &weather)
            .await;
        Ok(weather)
    }

    #[tracing::instrument(skip(self))]
    pub async fn hourly_12(&self, city: &str) -> Result<Vec<HourlyWeather>, WeatherError> {
        let coords = self.client.geocode(city).await?;
        let forecast = self.client.hourly_forecast(coords, HOURLY_WINDOW).await?;
        let hours = map_hours(forecast, HOURLY_WINDOW as usize);
        for hour in &hours {
            self.record(city, ForecastType::Hourly, Some(hour.temperature), hour)
                .await;
        }
        Ok(hours)
    }

    #[tracing::instrument(skip(self))]
    pub async fn tomorrow(&self, city: &str) -> Result<DailyWeather, WeatherError> {
        let coords = self.client.geocode(city).await?;
        let forecast = self.client.daily_forecast(coords, 2).await?;
        let tomorrow = map_days(forecast, 2).into_iter().nth(1).ok_or_else(|| {
            WeatherError::ForecastUnavailable("Tomorrow's forecast is unavailable".to_string())
        })?;
        self.record(city, ForecastType::Daily, None, &tomorrow).await;
        Ok(tomorrow)
    }

    /// Daily forecast for the next `days` days (the provider caps at 10).
    #[tracing::instrument(skip(self))]
    pub async fn forecast(&self, city: &str, days: u32) -> Result<Vec<DailyWeather>, WeatherError> {
        let coords = self.client.geocode(city).await?;
        let forecast = self.client.daily_forecast(coords, days).await?;
        let entries = map_days(forecast, days as usize);
        for day in &entries {
            self.record(city, ForecastType::Daily, None, day).await;
        }
        Ok(entries)
    }

    pub async fn history(&self, city: &str, limit: i64) -> Result<Vec<WeatherRecordRow>, StoreError> {
        self.history.weather_by_city(city, limit).await
    }

    pub async fn cities(&self) -> Result<Vec<String>, StoreError> {
        self.history.cities_with_data().await
    }

    pub async fn stats(&self, city: &str, days: i64) -> Result<WeatherStats, StoreError> {
        self.history.weather_stats(city, days).await
    }

    async fn record<T: Serialize>(
        &self,
        city: &str,
        forecast_type: ForecastType,
        temperature: Option<f64>,
        entry: &T,
    ) {
        let data = match serde_json::to_value(entry) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Failed to serialize {} weather for '{}': {}", forecast_type, city, e);
                return;
            }
        };
        let record = NewWeatherRecord {
            city: city.to_string(),
            forecast_type,
            temperature,
            data,
        };
        if let Err(e) = self.history.save_weather(record).await {
            tracing::warn!(
                "Failed to save {} weather for '{}' to history: {:#}",
                forecast_type,
                city,
                e
            );
        }
    }
}
