use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geographic position of a resolved city
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Kind of lookup a history record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastType {
    Current,
    Hourly,
    Daily,
}

impl ForecastType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastType::Current => "current",
            ForecastType::Hourly => "hourly",
            ForecastType::Daily => "daily",
        }
    }
}

impl fmt::Display for ForecastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current conditions in the flat shape returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: Option<f64>,
    pub condition: String,
    pub condition_type: Option<String>,
    pub is_day: bool,
    pub icon: String,
    pub precipitation_probability: Option<i64>,
    pub humidity: Option<i64>,
    pub pressure: Option<f64>,
    pub wind_direction: Option<String>,
    pub wind_speed: Option<f64>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

/// One hour of an hourly forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: Option<f64>,
    pub condition: String,
    pub icon: String,
    pub precipitation_probability: Option<i64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub humidity: Option<i64>,
    pub is_day: bool,
}

/// One day of a daily forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    /// Calendar date as `YYYY-MM-DD`
    pub date: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub condition_day: String,
    pub condition_night: String,
    pub icon_day: String,
    pub icon_night: String,
    pub precipitation_probability: Option<i64>,
    pub humidity_day: Option<i64>,
    pub humidity_night: Option<i64>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Temperature summary over a city's recorded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStats {
    pub city: String,
    pub avg_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub records_count: i64,
    pub period_days: i64,
}
