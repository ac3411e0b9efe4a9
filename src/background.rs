use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn, info_span, Instrument};
use crate::state::AppState;

/// Periodically recomputes every session's booking counter from the booking ledger.
/// Returns immediately when the interval is configured as zero.
pub async fn start_reconciliation_worker(state: Arc<AppState>) {
    let interval = state.config.reconcile_interval_secs;
    if interval == 0 {
        info!("Counter reconciliation disabled");
        return;
    }

    info!("Starting counter reconciliation worker (every {}s)...", interval);

    loop {
        sleep(Duration::from_secs(interval)).await;
        run_reconciliation_pass(&state)
            .instrument(info_span!("reconciliation_pass"))
            .await;
    }
}

pub async fn run_reconciliation_pass(state: &AppState) {
    match state.ledger.reconcile_all().await {
        Ok(repaired) if repaired.is_empty() => info!("Reconciliation pass found no drift"),
        Ok(repaired) => {
            for r in &repaired {
                warn!(
                    session_id = %r.session_id,
                    previous = r.previous,
                    confirmed = r.confirmed,
                    current = r.current,
                    "Booking counter drift repaired"
                );
            }
        }
        Err(e) => error!("Reconciliation pass aborted: {}", e),
    }
}
