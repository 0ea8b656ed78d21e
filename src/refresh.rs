//! Fixed-interval refresh of the aggregate cache.

use crate::api::state::AppState;
use std::time::Duration;
use tracing::{error, info, warn};

/// Refresh loop.
///
/// At most one run is ever in flight: the shared run guard is taken with
/// `try_lock`, so a tick that fires while a run (scheduled or cold-start) is
/// still going is suppressed rather than overlapped. A failed run leaves the
/// previously cached aggregate untouched.
pub async fn run_refresh_loop(state: AppState, period: Duration) {
    info!(?period, "refresh loop started");

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let Ok(_guard) = state.run_guard.try_lock() else {
            warn!("previous run still in flight; skipping this refresh tick");
            continue;
        };

        match state.pipeline.run().await {
            Ok(report) => match state.cache.store(&report).await {
                Ok(summary) => info!(
                    run_id = %summary.run_id,
                    total = summary.total_incidents,
                    skipped = summary.skipped_incidents,
                    degraded = summary.degraded_categories.len(),
                    "aggregate cache refreshed"
                ),
                Err(e) => error!("failed to serialize aggregate: {e}"),
            },
            Err(e) => error!("refresh run failed; keeping cached aggregate: {e}"),
        }
    }
}
