//! Liveness inference from byte counters
//!
//! Pure state tracking with caller-supplied instants so the timing rules
//! can be exercised without sleeping.

use std::time::{Duration, Instant};

use crate::types::Counters;

/// Inferred tunnel health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// No traffic observed yet
    Unknown,
    Alive,
    Dead,
}

/// State published to the supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessSnapshot {
    pub liveness: Liveness,
    pub counters: Counters,
}

impl LivenessSnapshot {
    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }
}

impl Default for LivenessSnapshot {
    fn default() -> Self {
        Self {
            liveness: Liveness::Unknown,
            counters: Counters::default(),
        }
    }
}

/// Notifications emitted by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessEvent {
    /// First read already showed traffic in both directions
    Connected,
    /// Alive tunnel stopped moving bytes for longer than the dead timeout
    Disconnected,
}

/// Tracks counter deltas and derives alive/dead transitions
#[derive(Debug)]
pub struct LivenessTracker {
    dead_timeout: Duration,
    baseline: Counters,
    last_change: Instant,
    liveness: Liveness,
    first_read_seen: bool,
}

impl LivenessTracker {
    pub fn new(dead_timeout: Duration, started_at: Instant) -> Self {
        Self {
            dead_timeout,
            baseline: Counters::default(),
            last_change: started_at,
            liveness: Liveness::Unknown,
            first_read_seen: false,
        }
    }

    /// Feed one poll result
    ///
    /// The baseline only moves forward: counters are monotonic for one
    /// tunnel process, so a lower reading is a partial rewrite and is ignored.
    pub fn observe(&mut self, counters: Counters, now: Instant) -> Option<LivenessEvent> {
        let mut event = None;

        if !self.first_read_seen {
            self.first_read_seen = true;
            if counters.both_positive() {
                event = Some(LivenessEvent::Connected);
            }
        }

        if counters.advanced_since(&self.baseline) {
            self.baseline = Counters::new(
                counters.bytes_received.max(self.baseline.bytes_received),
                counters.bytes_sent.max(self.baseline.bytes_sent),
            );
            self.last_change = now;
            self.liveness = Liveness::Alive;
            return event;
        }

        if self.liveness != Liveness::Dead && now.duration_since(self.last_change) > self.dead_timeout {
            let was_alive = self.liveness == Liveness::Alive;
            self.liveness = Liveness::Dead;
            if was_alive {
                return Some(LivenessEvent::Disconnected);
            }
        }

        event
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    pub fn snapshot(&self) -> LivenessSnapshot {
        LivenessSnapshot {
            liveness: self.liveness,
            counters: self.baseline,
        }
    }
}
