//! Payloads returned by the Google Geocoding and Weather APIs, and their
//! normalization into the flat shapes in [`crate::models::weather`].
//!
//! Only the fields the service reads are modelled; everything else in the
//! provider documents is ignored during deserialization.

use crate::models::weather::{Coordinates, CurrentWeather, DailyWeather, HourlyWeather};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Build the icon URL for a condition. The provider serves a light and a dark
/// variant under the same base URI.
pub fn build_icon_url(icon_base_uri: &str, is_day: bool) -> String {
    let suffix = if is_day { ".svg" } else { "_dark.svg" };
    format!("{}{}", icon_base_uri, suffix)
}

// ─── Geocoding ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Outcome of a geocoding lookup, classified from the provider status
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found(Coordinates),
    NotFound,
    /// Provider-level failure (`REQUEST_DENIED`, `OVER_QUERY_LIMIT`, ...)
    Failed(String),
}

impl GeocodeResponse {
    pub fn outcome(&self) -> GeocodeOutcome {
        match self.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => match self.results.first() {
                Some(result) => GeocodeOutcome::Found(Coordinates {
                    latitude: result.geometry.location.lat,
                    longitude: result.geometry.location.lng,
                }),
                None => GeocodeOutcome::NotFound,
            },
            Some(status) => GeocodeOutcome::Failed(status.to_string()),
        }
    }
}

// ─── Shared weather fragments ───────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCondition {
    pub icon_base_uri: String,
    pub description: Description,
    #[serde(rename = "type", default)]
    pub condition_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Description {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Temperature {
    pub degrees: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Precipitation {
    pub probability: Probability,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Probability {
    pub percent: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub direction: Option<WindDirection>,
    #[serde(default)]
    pub speed: Option<WindSpeed>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindDirection {
    #[serde(default)]
    pub degrees: Option<i64>,
    pub cardinal: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindSpeed {
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirPressure {
    pub mean_sea_level_millibars: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SunEvents {
    pub sunrise_time: DateTime<Utc>,
    pub sunset_time: DateTime<Utc>,
}

impl Wind {
    fn speed_value(&self) -> Option<f64> {
        self.speed.as_ref().map(|s| s.value)
    }

    fn cardinal(&self) -> Option<String> {
        self.direction.as_ref().map(|d| d.cardinal.clone())
    }
}

// ─── Current conditions ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub is_daytime: bool,
    pub weather_condition: WeatherCondition,
    pub temperature: Temperature,
    #[serde(default)]
    pub feels_like_temperature: Option<Temperature>,
    #[serde(default)]
    pub precipitation: Option<Precipitation>,
    #[serde(default)]
    pub wind: Option<Wind>,
    #[serde(default)]
    pub relative_humidity: Option<i64>,
    #[serde(default)]
    pub air_pressure: Option<AirPressure>,
    #[serde(default)]
    pub sun_events: Option<SunEvents>,
}

pub fn map_current(current: CurrentConditions) -> CurrentWeather {
    CurrentWeather {
        temperature: current.temperature.degrees,
        feels_like: current.feels_like_temperature.map(|t| t.degrees),
        icon: build_icon_url(
            &current.weather_condition.icon_base_uri,
            current.is_daytime,
        ),
        condition: current.weather_condition.description.text,
        condition_type: current.weather_condition.condition_type,
        is_day: current.is_daytime,
        precipitation_probability: current.precipitation.map(|p| p.probability.percent),
        humidity: current.relative_humidity,
        pressure: current.air_pressure.map(|p| p.mean_sea_level_millibars),
        wind_direction: current.wind.as_ref().and_then(Wind::cardinal),
        wind_speed: current.wind.as_ref().and_then(Wind::speed_value),
        sunrise: current.sun_events.as_ref().map(|s| s.sunrise_time),
        sunset: current.sun_events.as_ref().map(|s| s.sunset_time),
    }
}

// ─── Hourly forecast ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    #[serde(default)]
    pub forecast_hours: Vec<ForecastHour>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastHour {
    pub interval: Interval,
    pub is_daytime: bool,
    pub weather_condition: WeatherCondition,
    pub temperature: Temperature,
    #[serde(default)]
    pub feels_like_temperature: Option<Temperature>,
    #[serde(default)]
    pub relative_humidity: Option<i64>,
    #[serde(default)]
    pub precipitation: Option<Precipitation>,
    #[serde(default)]
    pub wind: Option<Wind>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub start_time: DateTime<Utc>,
}

pub fn map_hour(hour: ForecastHour) -> HourlyWeather {
    HourlyWeather {
        time: hour.interval.start_time,
        temperature: hour.temperature.degrees,
        feels_like: hour.feels_like_temperature.map(|t| t.degrees),
        icon: build_icon_url(&hour.weather_condition.icon_base_uri, hour.is_daytime),
        condition: hour.weather_condition.description.text,
        precipitation_probability: hour.precipitation.map(|p| p.probability.percent),
        wind_speed: hour.wind.as_ref().and_then(Wind::speed_value),
        wind_direction: hour.wind.as_ref().and_then(Wind::cardinal),
        humidity: hour.relative_humidity,
        is_day: hour.is_daytime,
    }
}

/// Normalize at most `limit` hours.
pub fn map_hours(forecast: HourlyForecast, limit: usize) -> Vec<HourlyWeather> {
    forecast
        .forecast_hours
        .into_iter()
        .take(limit)
        .map(map_hour)
        .collect()
}

// ─── Daily forecast ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    #[serde(default)]
    pub forecast_days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub display_date: DisplayDate,
    pub daytime_forecast: PartOfDayForecast,
    pub nighttime_forecast: PartOfDayForecast,
    pub max_temperature: Temperature,
    pub min_temperature: Temperature,
    pub sun_events: SunEvents,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartOfDayForecast {
    pub weather_condition: WeatherCondition,
    #[serde(default)]
    pub relative_humidity: Option<i64>,
    #[serde(default)]
    pub precipitation: Option<Precipitation>,
}

pub fn map_day(day: ForecastDay) -> DailyWeather {
    let date = &day.display_date;
    DailyWeather {
        date: format!("{:04}-{:02}-{:02}", date.year, date.month, date.day),
        max_temp: day.max_temperature.degrees,
        min_temp: day.min_temperature.degrees,
        icon_day: build_icon_url(&day.daytime_forecast.weather_condition.icon_base_uri, true),
        icon_night: build_icon_url(
            &day.nighttime_forecast.weather_condition.icon_base_uri,
            false,
        ),
        condition_day: day.daytime_forecast.weather_condition.description.text,
        condition_night: day.nighttime_forecast.weather_condition.description.text,
        precipitation_probability: day
            .daytime_forecast
            .precipitation
            .map(|p| p.probability.percent),
        humidity_day: day.daytime_forecast.relative_humidity,
        humidity_night: day.nighttime_forecast.relative_humidity,
        sunrise: day.sun_events.sunrise_time,
        sunset: day.sun_events.sunset_time,
    }
}

/// Normalize at most `limit` days.
pub fn map_days(forecast: DailyForecast, limit: usize) -> Vec<DailyWeather> {
    forecast
        .forecast_days
        .into_iter()
        .take(limit)
        .map(map_day)
        .collect()
}
