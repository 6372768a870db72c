use crate::state::AppState;
use anyhow::Result;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawn the retention sweeper background task.
///
/// Periodically deletes weather history older than the retention period and
/// drops rate-limiter entries whose whole window has expired.
pub fn start(state: AppState, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        run_loop(state, cancel).await;
    })
}

async fn run_loop(state: AppState, cancel: CancellationToken) {
    let interval = Duration::from_secs(state.config.history.sweep_interval_secs);
    tracing::info!(
        "Retention sweeper started (interval={:?}, retention={}s)",
        interval,
        state.config.history.retention_secs
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {},
            _ = cancel.cancelled() => {
                tracing::info!("Retention sweeper shutting down");
                return;
            }
        }

        if let Err(e) = sweep_once(&state).await {
            tracing::error!("Retention sweep error: {:#}", e);
        }
    }
}

/// Run a single sweep. Returns the number of history records removed.
pub async fn sweep_once(state: &AppState) -> Result<u64> {
    let retention = chrono::Duration::seconds(state.config.history.retention_secs as i64);
    let removed = state
        .history
        .purge_weather_before(Utc::now() - retention)
        .await?;
    if removed > 0 {
        tracing::info!("Purged {} expired weather record(s)", removed);
    }

    let idle = state.rate_limiter.purge_idle();
    if idle > 0 {
        tracing::debug!("Dropped {} idle rate-limit entries", idle);
    }

    Ok(removed)
}
