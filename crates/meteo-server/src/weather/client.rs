use super::WeatherError;
use crate::config::WeatherConfig;
use anyhow::Context;
use meteo_common::models::provider::{
    CurrentConditions, DailyForecast, GeocodeOutcome, GeocodeResponse, HourlyForecast,
};
use meteo_common::models::weather::Coordinates;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin client for the Google Geocoding and Weather APIs.
///
/// Transient failures (connect errors, timeouts, HTTP 429 and 5xx) are
/// retried with exponential backoff up to `max_retries` extra attempts.
#[derive(Clone)]
pub struct GoogleWeatherClient {
    http: Client,
    api_key: Option<String>,
    geocode_url: String,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl GoogleWeatherClient {
    pub fn new(config: &WeatherConfig) -> anyhow::Result<Self> {
        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("meteo-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build weather HTTP client")?;

        Ok(Self {
            http,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            geocode_url: config.geocode_url.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| WeatherError::Upstream("weather provider not configured".to_string()))
    }

    /// Resolve a city name to coordinates.
    #[tracing::instrument(skip(self))]
    pub async fn geocode(&self, city: &str) -> Result<Coordinates, WeatherError> {
        let key = self.api_key()?;
        let response: GeocodeResponse = self
            .get_json(&self.geocode_url, &[("address", city), ("key", key)])
            .await?;

        match response.outcome() {
            GeocodeOutcome::Found(coords) => Ok(coords),
            GeocodeOutcome::NotFound => Err(WeatherError::CityNotFound(city.to_string())),
            GeocodeOutcome::Failed(status) => {
                tracing::warn!(
                    "Geocoding failed for '{}': {} {}",
                    city,
                    status,
                    response.error_message.as_deref().unwrap_or("")
                );
                Err(WeatherError::Upstream(format!("geocoding failed ({status})")))
            }
        }
    }

    pub async fn current_conditions(
        &self,
        coords: Coordinates,
    ) -> Result<CurrentConditions, WeatherError> {
        self.lookup("currentConditions:lookup", coords, &[]).await
    }

    pub async fn hourly_forecast(
        &self,
        coords: Coordinates,
        hours: u32,
    ) -> Result<HourlyForecast, WeatherError> {
        self.lookup("forecast/hours:lookup", coords, &[("hours", hours)])
            .await
    }

    /// The provider pages days (5 per page by default); `pageSize` keeps
    /// the whole range in one response.
    pub async fn daily_forecast(
        &self,
        coords: Coordinates,
        days: u32,
    ) -> Result<DailyForecast, WeatherError> {
        self.lookup(
            "forecast/days:lookup",
            coords,
            &[("days", days), ("pageSize", days)],
        )
        .await
    }

    async fn lookup<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        coords: Coordinates,
        extra: &[(&str, u32)],
    ) -> Result<T, WeatherError> {
        let key = self.api_key()?;
        let url = format!("{}/{}", self.base_url, endpoint);
        let latitude = coords.latitude.to_string();
        let longitude = coords.longitude.to_string();
        let extra_values: Vec<String> = extra.iter().map(|(_, v)| v.to_string()).collect();

        let mut query = vec![
            ("location.latitude", latitude.as_str()),
            ("location.longitude", longitude.as_str()),
            ("key", key),
        ];
        for ((name, _), value) in extra.iter().zip(&extra_values) {
            query.push((*name, value.as_str()));
        }

        self.get_json(&url, &query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let mut attempt = 0u32;
        loop {
            let can_retry = attempt < self.max_retries;
            match self.http.get(url).query(query).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp.json::<T>().await.map_err(|e| {
                        tracing::warn!("Malformed provider response: {}", e.without_url());
                        WeatherError::Upstream("invalid response from weather provider".to_string())
                    });
                }
                Ok(resp) if can_retry && is_transient(resp.status()) => {
                    tracing::debug!("Provider returned {}, retrying", resp.status());
                }
                Ok(resp) => {
                    let status = resp.status();
                    tracing::warn!("Weather provider returned HTTP {}", status);
                    return Err(WeatherError::Upstream(format!(
                        "weather provider returned HTTP {}",
                        status.as_u16()
                    )));
                }
                Err(e) if can_retry && (e.is_connect() || e.is_timeout()) => {
                    tracing::debug!("Provider request failed, retrying: {}", sanitize(&e));
                }
                Err(e) => {
                    let message = sanitize(&e);
                    tracing::warn!("Weather provider request failed: {}", e.without_url());
                    return Err(WeatherError::Upstream(message.to_string()));
                }
            }

            tokio::time::sleep(self.retry_backoff * 2u32.saturating_pow(attempt)).await;
            attempt += 1;
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Error text safe to hand to clients; never includes the URL (and its key).
fn sanitize(error: &reqwest::Error) -> &'static str {
    if error.is_connect() {
        "connection refused or unreachable"
    } else if error.is_timeout() {
        "connection timed out"
    } else if error.is_decode() {
        "response decode error"
    } else {
        "network error"
    }
}
