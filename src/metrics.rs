// Runtime metrics module
//
// Lightweight counters for rebind sessions and settings changes

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Controller metrics
///
/// Uses atomic operations so the rebind task and the caller can record without locks.
/// Shared as `Arc<Metrics>` by [`crate::state::OptionStore`] and
/// [`crate::rebind::RebindController`]; logged on context shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Sessions that reached AwaitingInput
    pub rebinds_started: AtomicU64,

    /// Sessions finished by a captured input
    pub rebinds_completed: AtomicU64,

    /// Sessions finished by an explicit cancel
    pub rebinds_cancelled: AtomicU64,

    /// Sessions finished by the capture timeout
    pub rebinds_timed_out: AtomicU64,

    /// Sessions whose capture was dropped by the backend
    pub rebinds_aborted: AtomicU64,

    /// start_rebind calls refused because a session was already active
    pub rebinds_rejected: AtomicU64,

    /// Settings writes that changed a value
    pub settings_changes: AtomicU64,

    /// Setter calls that were silently skipped (unbound channel, stale index)
    pub settings_skipped: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            rebinds_started: AtomicU64::new(0),
            rebinds_completed: AtomicU64::new(0),
            rebinds_cancelled: AtomicU64::new(0),
            rebinds_timed_out: AtomicU64::new(0),
            rebinds_aborted: AtomicU64::new(0),
            rebinds_rejected: AtomicU64::new(0),
            settings_changes: AtomicU64::new(0),
            settings_skipped: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_rebind_started(&self) {
        self.rebinds_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebind_completed(&self) {
        self.rebinds_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebind_cancelled(&self) {
        self.rebinds_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebind_timed_out(&self) {
        self.rebinds_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebind_aborted(&self) {
        self.rebinds_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebind_rejected(&self) {
        self.rebinds_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settings_change(&self) {
        self.settings_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_settings_skipped(&self) {
        self.settings_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Sessions that have left AwaitingInput, whatever the outcome.
    pub fn rebinds_finished(&self) -> u64 {
        self.rebinds_completed.load(Ordering::Relaxed)
            + self.rebinds_cancelled.load(Ordering::Relaxed)
            + self.rebinds_timed_out.load(Ordering::Relaxed)
            + self.rebinds_aborted.load(Ordering::Relaxed)
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Settings Controller Metrics ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Rebinds: {} started, {} completed, {} cancelled, {} timed out, {} aborted, {} rejected",
            self.rebinds_started.load(Ordering::Relaxed),
            self.rebinds_completed.load(Ordering::Relaxed),
            self.rebinds_cancelled.load(Ordering::Relaxed),
            self.rebinds_timed_out.load(Ordering::Relaxed),
            self.rebinds_aborted.load(Ordering::Relaxed),
            self.rebinds_rejected.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Settings: {} changes, {} skipped writes",
            self.settings_changes.load(Ordering::Relaxed),
            self.settings_skipped.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
