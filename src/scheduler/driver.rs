use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use super::engine::Scheduler;

/// Granularity of the shutdown check while sleeping between ticks.
const SLEEP_SLICE_MS: u64 = 100;

/// Runs the scheduler on its fixed interval until shut down.
///
/// Ticks run one after another on this thread, so they can never overlap
/// from here; the engine's own gate additionally protects against ticks
/// triggered from other entry points. The interval is re-read from policy
/// after every tick so configuration edits apply without a restart.
pub struct TickDriver {
    scheduler: Arc<Scheduler>,
    shutdown: Arc<AtomicBool>,
}

impl TickDriver {
    pub fn new(scheduler: Arc<Scheduler>, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            scheduler,
            shutdown,
        }
    }

    /// Block running ticks until the shutdown flag flips.
    pub fn run(&self) {
        info!("scheduler started");
        while !self.shutdown.load(Ordering::Relaxed) {
            let now_ms = Utc::now().timestamp_millis();
            self.scheduler.tick(now_ms);

            let interval = Duration::from_secs(u64::from(
                self.scheduler.policy().check_interval_sec.max(1),
            ));
            self.sleep_interruptibly(interval);
        }
        info!("scheduler stopped");
    }

    /// Sleep in short slices so shutdown takes effect promptly.
    fn sleep_interruptibly(&self, total: Duration) {
        let mut remaining = total;
        while !remaining.is_zero() && !self.shutdown.load(Ordering::Relaxed) {
            let slice = remaining.min(Duration::from_millis(SLEEP_SLICE_MS));
            thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
