use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Open,
    Closed,
}

/// Lifecycle of the single upstream subscription.
///
/// Every close schedules exactly one reconnect after a fixed delay, forever.  A second
/// close notification for an instance that is already `Closed` schedules nothing, so a
/// burst of close/error signals can never stack up reconnect timers.
#[derive(Debug)]
pub struct Subscription {
    phase: Phase,
    last_open: Option<Instant>,
    reconnect_delay: Duration,
}

impl Subscription {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            phase: Phase::Closed,
            last_open: None,
            reconnect_delay,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_open(&self) -> Option<Instant> {
        self.last_open
    }

    /// Begin a new attempt.  Only valid once the previous instance has closed.
    pub fn connecting(&mut self) {
        debug_assert_eq!(self.phase, Phase::Closed, "previous subscription still live");
        self.phase = Phase::Connecting;
    }

    pub fn opened(&mut self, now: Instant) {
        self.phase = Phase::Open;
        self.last_open = Some(now);
    }

    /// Returns the delay before the next attempt, or `None` if this close was already seen.
    pub fn closed(&mut self) -> Option<Duration> {
        match self.phase {
            Phase::Closed => None,
            Phase::Connecting | Phase::Open => {
                self.phase = Phase::Closed;
                Some(self.reconnect_delay)
            }
        }
    }
}
