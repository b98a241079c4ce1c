//! Background task scheduler for recurring transactions
//!
//! Periodically materializes every occurrence that has fallen due across all
//! owners. The interval comes from `LedgerConfig::sweep`:
//!
//! - `interval_minutes`: minutes between sweeps (0 disables the scheduler)
//! - `horizon_days`: how far past today occurrences are materialized
//!
//! Each sweep is idempotent, so overlapping with a manual materialization or
//! a restart never duplicates entries.

use std::time::Duration;

use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{error, info, warn};

use fluxo_core::db::SweepSummary;
use fluxo_core::{Database, LedgerConfig, Result};

/// Run one sweep through `today + horizon_days`
pub fn run_sweep(db: &Database, config: &LedgerConfig, today: NaiveDate) -> Result<SweepSummary> {
    let through = config.materialize_limit(today);
    db.sweep_recurring(through, &config.recurring_suffix)
}

/// Start the recurring sweep as a background task
///
/// Returns None when the interval is 0.
pub fn start_recurring_scheduler(db: Database, config: LedgerConfig) -> Option<JoinHandle<()>> {
    if config.sweep.interval_minutes == 0 {
        warn!("Recurring sweep interval is 0, scheduled materialization disabled");
        return None;
    }

    info!(
        "Starting recurring scheduler: every {} minutes",
        config.sweep.interval_minutes
    );

    Some(tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.sweep.interval_minutes * 60));

        // Skip the first immediate tick - startup runs its own catch-up sweep
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let today = chrono::Utc::now().date_naive();
            match run_sweep(&db, &config, today) {
                Ok(summary) => {
                    info!(
                        definitions = summary.definitions,
                        created = summary.created,
                        failed = summary.failed,
                        "Scheduled recurring sweep completed"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Scheduled recurring sweep failed");
                }
            }
        }
    }))
}
