//! Core shared types and identifiers

use std::fmt;

/// Identifies which part of the system emitted a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    /// Candidate selection, failover and the command loop
    Supervisor,
    /// The external tunnel process and its output streams
    Tunnel,
    /// Background liveness polling
    Monitor,
    /// Notification sink
    Notifier,
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentId::Supervisor => write!(f, "supervisor"),
            ComponentId::Tunnel => write!(f, "tunnel"),
            ComponentId::Monitor => write!(f, "monitor"),
            ComponentId::Notifier => write!(f, "notifier"),
        }
    }
}
