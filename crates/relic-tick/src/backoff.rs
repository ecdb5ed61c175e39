//! Reconnect delays: exponential growth from `initial_delay`, capped at
//! `max_delay`, with optional jitter and a retry limit.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

/// When and how often the client dials again after losing its connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Master switch. Default: off.
    pub enabled: bool,
    /// Delay before the first retry. Default: 500 ms.
    pub initial_delay: Duration,
    /// Ceiling for any single delay. Default: 30 s.
    pub max_delay: Duration,
    /// Growth factor between attempts. Default: 2.0.
    pub multiplier: f64,
    /// Attempts before giving up. Default: 5.
    pub max_retries: u32,
    /// Relative jitter (0.0–1.0) applied to each delay. Default: 0.1.
    pub jitter: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_retries: 5,
            jitter: 0.1,
        }
    }
}

impl ReconnectPolicy {
    /// Largest `max_delay` accepted by [`validated`](Self::validated).
    pub const MAX_DELAY: Duration = Duration::from_secs(3600);

    /// The default policy with reconnection switched on.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the policy is safe to use.
    ///
    /// - `multiplier` is at least 1.0
    /// - `jitter` is clamped to `0.0..=1.0`
    /// - `max_delay` is at most [`Self::MAX_DELAY`]
    /// - `initial_delay` is at most `max_delay`
    pub fn validated(mut self) -> Self {
        if self.max_delay > Self::MAX_DELAY {
            warn!(
                max_delay_s = self.max_delay.as_secs(),
                "backoff max_delay above one hour, clamping"
            );
            self.max_delay = Self::MAX_DELAY;
        }
        if self.multiplier.is_nan() || self.multiplier < 1.0 {
            warn!(multiplier = self.multiplier, "backoff multiplier below 1.0, clamping");
            self.multiplier = 1.0;
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            self.jitter = if self.jitter > 1.0 { 1.0 } else { 0.0 };
        }
        if self.initial_delay > self.max_delay {
            self.initial_delay = self.max_delay;
        }
        self
    }
}

/// Produces the delay before each reconnect attempt.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy: policy.validated(),
            attempts: 0,
        }
    }

    /// Delay before the next attempt, or `None` once `max_retries` attempts
    /// have been handed out.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.policy.max_retries {
            debug!(attempts = self.attempts, "reconnect attempts exhausted");
            return None;
        }

        let max = self.policy.max_delay.as_secs_f64();
        let base = self.policy.initial_delay.as_secs_f64()
            * self.policy.multiplier.powi(self.attempts as i32);
        let mut secs = base.min(max);

        if self.policy.jitter > 0.0 {
            let spread = self.policy.jitter;
            secs *= 1.0 + rand::rng().random_range(-spread..=spread);
        }

        self.attempts += 1;
        Some(Duration::from_secs_f64(secs.clamp(0.0, max)))
    }

    /// Starts over after a successful connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Attempts handed out since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }
}
