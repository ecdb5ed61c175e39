//! Keepalive timer. Fires every `interval` once a connection is open.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when a beat fires later than scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissedBeatPolicy {
    /// Forget the missed beats and schedule the next one from now.
    #[default]
    Skip,
    /// Keep the original cadence. Missed beats fire back to back until the
    /// schedule has caught up.
    Burst,
}

/// Configuration for the heartbeat scheduler.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Time between beats. Default: 3 s.
    pub interval: Duration,
    /// Handling of late beats.
    pub policy: MissedBeatPolicy,
    /// Upper bound of random delay added to the *first* beat only.
    /// Default: zero.
    pub initial_jitter: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            policy: MissedBeatPolicy::default(),
            initial_jitter: Duration::ZERO,
        }
    }
}

impl HeartbeatConfig {
    /// Keepalive period used by the game server.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

    /// Shortest interval accepted by [`validated`](Self::validated).
    pub const MIN_INTERVAL: Duration = Duration::from_millis(100);

    /// Longest interval accepted by [`validated`](Self::validated).
    pub const MAX_INTERVAL: Duration = Duration::from_secs(3600);

    /// Config with the given interval and default everything else.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called by [`HeartbeatScheduler::new`]. An interval below
    /// [`Self::MIN_INTERVAL`] is raised to it, one above
    /// [`Self::MAX_INTERVAL`] is lowered to it, and `initial_jitter` is at
    /// most one interval.
    pub fn validated(mut self) -> Self {
        if self.interval > Self::MAX_INTERVAL {
            warn!(
                interval_s = self.interval.as_secs(),
                "heartbeat interval above maximum, clamping"
            );
            self.interval = Self::MAX_INTERVAL;
        }
        if self.interval < Self::MIN_INTERVAL {
            warn!(
                interval_ms = self.interval.as_millis() as u64,
                min_ms = Self::MIN_INTERVAL.as_millis() as u64,
                "heartbeat interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        self.initial_jitter = self.initial_jitter.min(self.interval);
        self
    }
}

/// Returned by [`HeartbeatScheduler::wait_for_beat`] each time it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatInfo {
    /// Beat number, starting at 1.
    pub beat: u64,
    /// `true` if the beat fired more than 10% of an interval late.
    pub late: bool,
    /// Whole intervals that went by without a beat.
    pub missed: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-interval keepalive timer.
///
/// One scheduler per open connection. Dropping it cancels the timer.
pub struct HeartbeatScheduler {
    config: HeartbeatConfig,
    next_beat: Instant,
    beats: u64,
    paused: bool,
}

impl HeartbeatScheduler {
    /// Creates a scheduler whose first beat is one interval (plus jitter)
    /// from now.
    pub fn new(config: HeartbeatConfig) -> Self {
        let config = config.validated();

        let jitter = if config.initial_jitter.is_zero() {
            Duration::ZERO
        } else {
            let max = config.initial_jitter.as_micros() as u64;
            Duration::from_micros(rand::rng().random_range(0..=max))
        };

        debug!(
            interval_ms = config.interval.as_millis() as u64,
            policy = ?config.policy,
            "heartbeat scheduler created"
        );

        Self {
            next_beat: Instant::now() + config.interval + jitter,
            config,
            beats: 0,
            paused: false,
        }
    }

    /// Waits for the next beat.
    ///
    /// Pends forever while paused. Cancel-safe: dropping the future before
    /// it resolves leaves the schedule untouched.
    pub async fn wait_for_beat(&mut self) -> BeatInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let due = self.next_beat;
        let interval = self.config.interval;
        time::sleep_until(due).await;

        let now = Instant::now();
        self.beats += 1;

        let late_by = now.saturating_duration_since(due);
        let late = late_by > interval / 10;
        let missed = (late_by.as_nanos() / interval.as_nanos()) as u64;

        self.next_beat = match self.config.policy {
            MissedBeatPolicy::Skip => {
                if missed > 0 {
                    warn!(beat = self.beats, missed, "heartbeat late, skipping ahead");
                }
                now + interval
            }
            MissedBeatPolicy::Burst => due + interval,
        };

        trace!(beat = self.beats, late, "heartbeat");

        BeatInfo {
            beat: self.beats,
            late,
            missed,
        }
    }

    /// Stops beats until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(beat = self.beats, "heartbeat paused");
        }
    }

    /// Restarts beats, the next one a full interval from now.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_beat = Instant::now() + self.config.interval;
            debug!(beat = self.beats, "heartbeat resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Beats fired so far.
    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}
