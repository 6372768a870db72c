pub mod client;
pub mod service;

pub use client::GoogleWeatherClient;
pub use service::WeatherService;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City '{0}' not found")]
    CityNotFound(String),
    /// The provider answered but did not cover the requested period
    #[error("{0}")]
    ForecastUnavailable(String),
    #[error("Weather service unavailable: {0}")]
    Upstream(String),
}
