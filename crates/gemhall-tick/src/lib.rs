//! Fixed-interval scheduling for Gemhall's background sweeps.
//!
//! The turn-timeout sweeper wakes once per interval, asks the room store
//! which deadlines have passed, and goes back to sleep. [`TickScheduler`]
//! owns that cadence: it sleeps on Tokio's timer (so tests can pause time),
//! skips ahead instead of bursting when the process falls behind, and
//! staggers its first wake-up with a little jitter.
//!
//! ```ignore
//! let mut ticks = TickScheduler::new(TickConfig::every(Duration::from_secs(1)));
//! loop {
//!     let info = ticks.wait_for_tick().await;
//!     let updates = store.process_timeouts(clock.now()).await;
//!     // broadcast updates
//! }
//! ```
//!
//! Wall-clock time for deadlines comes from a separate [`Clock`].

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between ticks.
    pub interval: Duration,
    /// Upper bound of the random delay added before the first tick.
    pub initial_jitter: Duration,
}

impl TickConfig {
    /// Shortest accepted interval.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

    /// A config firing every `interval` with the default jitter.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamps the interval to [`MIN_INTERVAL`](Self::MIN_INTERVAL).
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                "tick interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            initial_jitter: Duration::from_millis(50),
        }
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// 1-based tick number.
    pub tick: u64,
    /// Whether this tick fired more than 10% of an interval late.
    pub overrun: bool,
    /// Whole intervals dropped because of the overrun.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval tick source.
///
/// A late tick schedules the next one a full interval from *now*, dropping
/// the ticks that were missed. A sweep catches up on every expired deadline
/// in one pass, so replaying missed ticks gains nothing.
pub struct TickScheduler {
    config: TickConfig,
    tick_count: u64,
    next_tick: Instant,
}

impl TickScheduler {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();

        let jitter_us = config.initial_jitter.as_micros() as u64;
        let jitter = if jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..jitter_us))
        } else {
            Duration::ZERO
        };
        let next_tick = Instant::now() + config.interval + jitter;

        debug!(
            interval_ms = config.interval.as_millis() as u64,
            "tick scheduler created"
        );

        Self {
            config,
            tick_count: 0,
            next_tick,
        }
    }

    /// Sleeps until the next tick is due and reports it.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let due = self.next_tick;
        let interval = self.config.interval;
        time::sleep_until(due).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > interval / 10;
        let mut ticks_skipped = 0;

        if overrun {
            ticks_skipped = (late_by.as_nanos() / interval.as_nanos()) as u64;
            if ticks_skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = ticks_skipped,
                    late_ms = late_by.as_millis() as u64,
                    "tick overrun, skipping ahead"
                );
            }
        }
        self.next_tick = now + interval;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}
