use std::time::Duration;

use tokio::sync::watch;

use crate::db;
use crate::rate_limit::CONTACT_WINDOW_SECS;
use crate::state::SharedState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);
const LOGIN_ENTRY_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Periodically forget stale rate-limit entries and expired sessions until
/// shutdown is signaled.
pub async fn run_housekeeping(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Housekeeping started");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
            _ = shutdown.changed() => {}
        }
        if *shutdown.borrow() {
            break;
        }
        sweep(&state).await;
    }

    tracing::debug!("Housekeeping stopped");
}

async fn sweep(state: &SharedState) {
    state
        .contact_limiter
        .cleanup(Duration::from_secs(CONTACT_WINDOW_SECS));
    state.login_limiter.cleanup(LOGIN_ENTRY_MAX_AGE);

    match db::sessions::delete_expired(&state.pool).await {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "Removed expired sessions"),
        Err(e) => tracing::error!("Failed to remove expired sessions: {e}"),
    }
}
