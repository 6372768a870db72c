use super::middleware::{AuthUser, WeatherScope};
use super::Envelope;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum_extra::extract::WithRejection;
use meteo_common::models::weather::{CurrentWeather, DailyWeather, HourlyWeather, WeatherStats};
use meteo_common::validation::validate_city_name;
use meteo_db::WeatherRecordRow;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub city: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub city: String,
    pub days: Option<i64>,
}

type CityParam = WithRejection<Query<CityQuery>, ApiError>;

fn bounded(name: &str, value: Option<i64>, default: i64, max: i64) -> Result<i64, ApiError> {
    let value = value.unwrap_or(default);
    if !(1..=max).contains(&value) {
        return Err(ApiError::InvalidInput(format!(
            "{name} must be between 1 and {max}"
        )));
    }
    Ok(value)
}

/// GET /coordinates?city= -- geocoding only, no token required
#[tracing::instrument(skip(state, query))]
pub async fn coordinates(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): CityParam,
) -> Result<Envelope<Value>, ApiError> {
    let city = validate_city_name(&query.city)?;
    let coords = state.weather.resolve_coordinates(&city).await?;
    Ok(Envelope::ok(json!({
        "city": city,
        "latitude": coords.latitude,
        "longitude": coords.longitude,
    })))
}

/// GET /weather/current?city=
pub async fn current(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
    WithRejection(Query(query), _): CityParam,
) -> Result<Envelope<CurrentWeather>, ApiError> {
    let city = validate_city_name(&query.city)?;
    let weather = state.weather.current(&city).await?;
    Ok(Envelope::with_message(weather, format!("Current weather for {city}")))
}

/// GET /weather/hourly-12?city=
pub async fn hourly_12(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
    WithRejection(Query(query), _): CityParam,
) -> Result<Envelope<Vec<HourlyWeather>>, ApiError> {
    let city = validate_city_name(&query.city)?;
    Ok(Envelope::ok(state.weather.hourly_12(&city).await?))
}

/// GET /weather/tomorrow?city=
pub async fn tomorrow(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
    WithRejection(Query(query), _): CityParam,
) -> Result<Envelope<DailyWeather>, ApiError> {
    let city = validate_city_name(&query.city)?;
    Ok(Envelope::ok(state.weather.tomorrow(&city).await?))
}

/// GET /weather/forecast-3days?city=
pub async fn forecast_3days(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
    WithRejection(Query(query), _): CityParam,
) -> Result<Envelope<Vec<DailyWeather>>, ApiError> {
    let city = validate_city_name(&query.city)?;
    Ok(Envelope::ok(state.weather.forecast(&city, 3).await?))
}

/// GET /weather/forecast-7days?city=
pub async fn forecast_7days(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
    WithRejection(Query(query), _): CityParam,
) -> Result<Envelope<Vec<DailyWeather>>, ApiError> {
    let city = validate_city_name(&query.city)?;
    Ok(Envelope::ok(state.weather.forecast(&city, 7).await?))
}

/// GET /weather/history?city=&limit=
pub async fn history(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
    WithRejection(Query(query), _): WithRejection<Query<HistoryQuery>, ApiError>,
) -> Result<Envelope<Vec<WeatherRecordRow>>, ApiError> {
    let city = validate_city_name(&query.city)?;
    let limit = bounded("limit", query.limit, 10, 100)?;
    Ok(Envelope::ok(state.weather.history(&city, limit).await?))
}

/// GET /weather/cities
pub async fn cities(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
) -> Result<Envelope<Vec<String>>, ApiError> {
    Ok(Envelope::ok(state.weather.cities().await?))
}

/// GET /weather/stats?city=&days=
pub async fn stats(
    State(state): State<Arc<AppState>>,
    _user: AuthUser<WeatherScope>,
    WithRejection(Query(query), _): WithRejection<Query<StatsQuery>, ApiError>,
) -> Result<Envelope<WeatherStats>, ApiError> {
    let city = validate_city_name(&query.city)?;
    let days = bounded("days", query.days, 7, 30)?;
    Ok(Envelope::ok(state.weather.stats(&city, days).await?))
}
