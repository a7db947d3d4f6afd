//! Session lifecycle state machine
//!
//! `Idle → Connecting → Connected → Monitoring ⇄ Degraded → Disconnected`,
//! with `Failed` reachable from `Connecting`. One session per attempt.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::error::{SupervisorError, SupervisorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Idle,
    Connecting,
    Connected,
    Monitoring,
    Degraded,
    Disconnected,
    Failed,
}

impl SessionPhase {
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Connected)
                | (Connecting, Failed)
                | (Connected, Monitoring)
                | (Monitoring, Degraded)
                | (Monitoring, Disconnected)
                | (Degraded, Monitoring)
                | (Degraded, Disconnected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Disconnected | SessionPhase::Failed)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Connecting => "connecting",
            SessionPhase::Connected => "connected",
            SessionPhase::Monitoring => "monitoring",
            SessionPhase::Degraded => "degraded",
            SessionPhase::Disconnected => "disconnected",
            SessionPhase::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Outcome of waiting for the handshake marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeResult {
    Pending,
    Success,
    Failure,
}

/// One supervised tunnel attempt
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    candidate_index: usize,
    identifier: String,
    started_at: DateTime<Utc>,
    handshake: HandshakeResult,
    phase: SessionPhase,
    history: Vec<SessionPhase>,
}

impl Session {
    pub fn new(candidate_index: usize, identifier: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate_index,
            identifier: identifier.into(),
            started_at: Utc::now(),
            handshake: HandshakeResult::Pending,
            phase: SessionPhase::Idle,
            history: vec![SessionPhase::Idle],
        }
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn advance(&mut self, next: SessionPhase) -> SupervisorResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(SupervisorError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        match next {
            SessionPhase::Connected => self.handshake = HandshakeResult::Success,
            SessionPhase::Failed => self.handshake = HandshakeResult::Failure,
            _ => {}
        }

        self.phase = next;
        self.history.push(next);
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn candidate_index(&self) -> usize {
        self.candidate_index
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn handshake(&self) -> HandshakeResult {
        self.handshake
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn history(&self) -> &[SessionPhase] {
        &self.history
    }
}
