use std::time::Duration;
use url::Url;

/// Timing and retry settings for a relay connection.
#[derive(Clone, Debug)]
pub struct Config {
    /// Relay endpoint URL.
    pub url: Url,
    /// Interval between application-level `ping` messages.
    pub heartbeat_interval: Duration,
    /// Interval between staleness checks.
    pub stale_check_interval: Duration,
    /// Silence longer than this closes the connection, even if the transport looks healthy.
    pub stale_threshold: Duration,
    /// Delay before the first reconnect.
    pub reconnect_base_delay: Duration,
    /// Added to the delay for every consecutive failed attempt.
    pub reconnect_step: Duration,
    /// Upper bound on the reconnect delay.
    pub reconnect_max_delay: Duration,
    /// Consecutive reconnects allowed before giving up.
    pub max_reconnect_attempts: u32,
    /// Timeout for a single connection attempt.
    pub connect_timeout: Duration,
}

impl Config {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            heartbeat_interval: Duration::from_millis(5000),
            stale_check_interval: Duration::from_millis(5000),
            stale_threshold: Duration::from_millis(10_000),
            reconnect_base_delay: Duration::from_millis(2000),
            reconnect_step: Duration::from_millis(1000),
            reconnect_max_delay: Duration::from_millis(10_000),
            max_reconnect_attempts: 50,
            connect_timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub fn stale_check(mut self, interval: Duration, threshold: Duration) -> Self {
        self.stale_check_interval = interval;
        self.stale_threshold = threshold;
        self
    }

    #[must_use]
    pub fn reconnect_delays(mut self, base: Duration, step: Duration, max: Duration) -> Self {
        self.reconnect_base_delay = base;
        self.reconnect_step = step;
        self.reconnect_max_delay = max;
        self
    }

    #[must_use]
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Linear backoff: `min(base + attempts * step, max)`.
    pub fn reconnect_delay(&self, attempts: u32) -> Duration {
        self.reconnect_step
            .saturating_mul(attempts)
            .saturating_add(self.reconnect_base_delay)
            .min(self.reconnect_max_delay)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.heartbeat_interval.is_zero() {
            return Err("Heartbeat interval must be > 0".to_string());
        }
        if self.stale_check_interval.is_zero() {
            return Err("Staleness check interval must be > 0".to_string());
        }
        if self.stale_threshold < self.heartbeat_interval {
            return Err("Staleness threshold must be >= heartbeat interval".to_string());
        }
        if self.reconnect_max_delay < self.reconnect_base_delay {
            return Err("Max reconnect delay must be >= base reconnect delay".to_string());
        }
        if self.connect_timeout.is_zero() {
            return Err("Connect timeout must be > 0".to_string());
        }
        Ok(())
    }
}
