use serde::{Deserialize, Serialize};

/// Database configuration. When absent the server keeps state in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Account seeded on startup if the username is not taken
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialUserConfig {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub access_token_ttl_minutes: i64,
    #[serde(default)]
    pub initial_users: Vec<InitialUserConfig>,
}

fn default_token_ttl() -> i64 {
    30
}

/// Sliding-window limiter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Paths that bypass the limiter entirely
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_max_requests() -> usize {
    100
}
fn default_window_secs() -> u64 {
    60
}
fn default_excluded_paths() -> Vec<String> {
    ["/docs", "/openapi.json", "/redoc", "/health"]
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            excluded_paths: default_excluded_paths(),
        }
    }
}

/// Google geocoding / weather endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after the first for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}
fn default_weather_base_url() -> String {
    "https://weather.googleapis.com/v1".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    200
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocode_url: default_geocode_url(),
            base_url: default_weather_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Weather history retention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Records older than this are deleted by the sweeper (default: 24h)
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// How often the sweeper runs in seconds (default: 300)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_retention_secs() -> u64 {
    86_400
}
fn default_sweep_interval() -> u64 {
    300
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Server configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    pub db: Option<DbConfig>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

/// Load server config from a YAML file with METEO__ env var overrides.
pub fn load_config(path: &str) -> anyhow::Result<ServerConfig> {
    use anyhow::Context;
    let config: ServerConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml))
        .add_source(
            config::Environment::with_prefix("METEO")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to build config from: {}", path))?
        .try_deserialize()
        .with_context(|| format!("Failed to deserialize config from: {}", path))?;
    Ok(config)
}
