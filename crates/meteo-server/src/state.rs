use crate::auth::{Authenticator, ScopeAuthorizer, TokenKeys};
use crate::config::ServerConfig;
use crate::rate_limit::RateLimiter;
use crate::weather::{GoogleWeatherClient, WeatherService};
use meteo_db::{UserStore, WeatherHistoryStore};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub authenticator: Authenticator,
    pub authorizer: ScopeAuthorizer,
    pub rate_limiter: Arc<RateLimiter>,
    pub weather: WeatherService,
    pub history: Arc<dyn WeatherHistoryStore>,
}

impl AppState {
    /// Wire the components from config and the chosen storage backends.
    pub fn new(
        config: ServerConfig,
        users: Arc<dyn UserStore>,
        history: Arc<dyn WeatherHistoryStore>,
    ) -> anyhow::Result<Self> {
        let keys = TokenKeys::new(&config.auth.jwt_secret);
        let ttl = chrono::Duration::minutes(config.auth.access_token_ttl_minutes);
        let rate_limiter = RateLimiter::new(
            config.rate_limit.max_requests,
            Duration::from_secs(config.rate_limit.window_secs),
        );
        let client = GoogleWeatherClient::new(&config.weather)?;

        Ok(Self {
            authenticator: Authenticator::new(users.clone(), keys.clone(), ttl),
            authorizer: ScopeAuthorizer::new(users, keys),
            rate_limiter: Arc::new(rate_limiter),
            weather: WeatherService::new(client, history.clone()),
            history,
            config: Arc::new(config),
        })
    }

    /// Replace the limiter, e.g. with an isolated instance in tests.
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Arc::new(limiter);
        self
    }
}
