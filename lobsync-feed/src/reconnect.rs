//! Reconnection backoff for the board stream.

use std::time::Duration;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Whether reconnection is enabled.
    pub enabled: bool,
    /// Delay before the first reconnect after a healthy session.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Growth factor applied per consecutive failure.
    pub backoff_multiplier: f64,
    /// Reconnects allowed in a row without a healthy session (0 = unlimited).
    pub max_attempts: usize,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            max_attempts: 0,
        }
    }
}

impl ReconnectConfig {
    /// Enables or disables automatic reconnection.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the initial reconnection delay.
    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the delay cap.
    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the consecutive reconnect limit (0 = unlimited).
    #[must_use]
    pub fn max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max;
        self
    }

    /// Delay before the `attempt`-th consecutive reconnect, counting from 1.
    ///
    /// Grows geometrically from `initial_delay` and saturates at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let secs = (self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent)).max(0.0);
        if secs.is_finite() && secs < self.max_delay.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max_delay
        }
    }
}

/// Consecutive-failure counter for the board stream.
///
/// A session counts as healthy only once its snapshot has been applied, so
/// sessions that connect but never initialize keep growing the delay.
#[derive(Debug)]
pub struct ReconnectState {
    config: ReconnectConfig,
    failures: usize,
}

impl ReconnectState {
    /// Creates a state with no recorded failures.
    #[must_use]
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            failures: 0,
        }
    }

    /// Records a failed session and returns how long to wait before the
    /// next one, or `None` once reconnecting should stop.
    pub fn on_failure(&mut self) -> Option<Duration> {
        if !self.can_retry() {
            return None;
        }
        self.failures += 1;
        Some(self.config.delay_for(self.failures))
    }

    /// Records a healthy session, restarting the backoff.
    pub fn on_healthy(&mut self) {
        if self.failures > 0 {
            tracing::debug!("Session healthy after {} failed sessions", self.failures);
        }
        self.failures = 0;
    }

    /// Returns the failures since the last healthy session.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.failures
    }

    /// Returns true if another failure would still be retried.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.config.enabled
            && (self.config.max_attempts == 0 || self.failures < self.config.max_attempts)
    }
}
