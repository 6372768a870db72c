use anyhow::{Context, Result};
use meteo_db::{create_pool, run_migrations, MemoryStore, PgStore, UserStore, WeatherHistoryStore};
use meteo_server::config::load_config;
use meteo_server::seed::seed_initial_users;
use meteo_server::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting meteo server");

    let config_path =
        std::env::var("METEO_CONFIG").unwrap_or_else(|_| "server-config.yaml".to_string());
    tracing::info!("Loading config from: {}", config_path);
    let config = load_config(&config_path)?;

    if config.weather.api_key.is_none() {
        tracing::warn!("No weather API key configured; weather endpoints will return 503");
    }

    let (users, history): (Arc<dyn UserStore>, Arc<dyn WeatherHistoryStore>) = match &config.db {
        Some(db) => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(&db.url, db.max_connections).await?;
            tracing::info!("Running database migrations...");
            run_migrations(&pool).await?;
            let store = Arc::new(PgStore::new(pool));
            let users: Arc<dyn UserStore> = store.clone();
            (users, store as Arc<dyn WeatherHistoryStore>)
        }
        None => {
            tracing::warn!("No database configured; users and history are kept in memory");
            let store = Arc::new(MemoryStore::new());
            let users: Arc<dyn UserStore> = store.clone();
            (users, store as Arc<dyn WeatherHistoryStore>)
        }
    };

    seed_initial_users(users.as_ref(), &config.auth.initial_users).await?;

    let listen = config.listen.clone();
    let state = AppState::new(config, users, history)?;

    // Start background tasks
    let cancel_token = CancellationToken::new();
    let retention = meteo_server::retention::start(state.clone(), cancel_token.clone());

    let app = meteo_server::web::build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind to {}", listen))?;
    tracing::info!("Server listening on {}", listen);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
    .await
    .context("Server error")?;

    cancel_token.cancel();
    let _ = retention.await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping...");
    cancel_token.cancel();
}
