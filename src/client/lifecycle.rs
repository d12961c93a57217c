//! The connection state machine, free of any I/O.
//!
//! The driver in `connection.rs` feeds transport events in and carries out the returned
//! [`Action`]s.  Keeping the rules here makes every transition testable without sockets.
use super::Config;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Open,
    Closing,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Start the heartbeat and staleness timers.
    ArmTimers,
    /// Cancel both timers.
    DisarmTimers,
    /// Send an application-level `ping`.
    SendPing,
    /// Close the transport because it looks dead.
    ForceClose,
    /// Close the transport on purpose; no reconnect follows.
    CloseIntentionally,
    /// Open a fresh connection after `after`.
    Reconnect { attempt: u32, after: Duration },
    /// The reconnect budget is spent.
    GiveUp { attempts: u32 },
}

#[derive(Debug)]
pub struct Lifecycle {
    cfg: Config,
    phase: Phase,
    reconnect_attempts: u32,
    last_message: Instant,
    should_reconnect: bool,
    timers_armed: bool,
}

impl Lifecycle {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            phase: Phase::Closed,
            reconnect_attempts: 0,
            last_message: Instant::now(),
            should_reconnect: true,
            timers_armed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }
    pub fn should_reconnect(&self) -> bool {
        self.should_reconnect
    }
    pub fn timers_armed(&self) -> bool {
        self.timers_armed
    }
    pub fn last_message(&self) -> Instant {
        self.last_message
    }

    /// Start a new attempt with a fresh transport.  Returns `false` after `dispose`.
    pub fn connecting(&mut self) -> bool {
        if !self.should_reconnect {
            return false;
        }
        debug_assert!(!self.timers_armed, "timers outlived their connection");
        self.phase = Phase::Connecting;
        true
    }

    pub fn opened(&mut self, now: Instant) -> Vec<Action> {
        self.phase = Phase::Open;
        self.reconnect_attempts = 0;
        self.last_message = now;
        self.timers_armed = true;
        vec![Action::ArmTimers]
    }

    /// Any inbound frame counts as traffic, keepalives included.
    pub fn received(&mut self, now: Instant) {
        self.last_message = now;
    }

    pub fn heartbeat_due(&self) -> Option<Action> {
        match self.phase {
            Phase::Open => Some(Action::SendPing),
            _ => None,
        }
    }

    pub fn heartbeat_failed(&mut self) -> Vec<Action> {
        self.force_close()
    }

    pub fn staleness_check(&mut self, now: Instant) -> Vec<Action> {
        let silent_for = now.saturating_duration_since(self.last_message);
        match self.phase {
            Phase::Open if silent_for > self.cfg.stale_threshold => {
                log::warn!(
                    "No traffic from the relay for {:?}; closing a connection that looks dead",
                    silent_for
                );
                self.force_close()
            }
            _ => Vec::new(),
        }
    }

    /// Errors carry no transition of their own; the close that follows is authoritative.
    pub fn errored(&self, e: &dyn std::fmt::Display) {
        log::warn!("Relay connection error: {}", e);
    }

    pub fn closed(&mut self) -> Vec<Action> {
        if self.phase == Phase::Closed {
            return Vec::new();
        }
        let mut actions = self.disarm();
        self.phase = Phase::Closed;

        if !self.should_reconnect {
            return actions;
        }
        if self.reconnect_attempts < self.cfg.max_reconnect_attempts {
            let after = self.cfg.reconnect_delay(self.reconnect_attempts);
            self.reconnect_attempts += 1;
            actions.push(Action::Reconnect {
                attempt: self.reconnect_attempts,
                after,
            });
        } else {
            actions.push(Action::GiveUp {
                attempts: self.reconnect_attempts,
            });
        }
        actions
    }

    /// Intentional teardown.  No reconnect is scheduled after this, whatever arrives later.
    pub fn dispose(&mut self) -> Vec<Action> {
        self.should_reconnect = false;
        let mut actions = self.disarm();
        if matches!(self.phase, Phase::Connecting | Phase::Open) {
            self.phase = Phase::Closing;
            actions.push(Action::CloseIntentionally);
        }
        actions
    }

    fn force_close(&mut self) -> Vec<Action> {
        let mut actions = self.disarm();
        if self.phase == Phase::Open {
            self.phase = Phase::Closing;
            actions.push(Action::ForceClose);
        }
        actions
    }

    fn disarm(&mut self) -> Vec<Action> {
        if self.timers_armed {
            self.timers_armed = false;
            vec![Action::DisarmTimers]
        } else {
            Vec::new()
        }
    }
}
