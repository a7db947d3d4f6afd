//! Domain types shared across the supervisor

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

use crate::core::session::SessionPhase;
use crate::error::{SupervisorError, SupervisorResult};

/// One relay server offering a tunnel endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Hostname; non-empty and unique within a list
    pub identifier: String,
    pub country_long: String,
    pub country_short: String,
    pub address: String,
    /// Opaque configuration blob handed to the materializer
    pub config_payload: Vec<u8>,
}

/// Ordered candidate list; order is both display and failover order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    candidates: Vec<Candidate>,
}

impl CandidateList {
    /// Validate identifiers and wrap the list
    pub fn new(candidates: Vec<Candidate>) -> SupervisorResult<Self> {
        let mut seen = HashSet::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.identifier.trim().is_empty() {
                return Err(SupervisorError::invalid_list(format!(
                    "candidate {} has an empty identifier",
                    index + 1
                )));
            }
            if !seen.insert(candidate.identifier.as_str()) {
                return Err(SupervisorError::invalid_list(format!(
                    "duplicate identifier '{}'",
                    candidate.identifier
                )));
            }
        }
        Ok(Self { candidates })
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }
}

/// Traffic counters read from the status artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

impl Counters {
    pub fn new(bytes_received: u64, bytes_sent: u64) -> Self {
        Self { bytes_received, bytes_sent }
    }

    /// True when either counter moved past `previous`
    pub fn advanced_since(&self, previous: &Counters) -> bool {
        self.bytes_received > previous.bytes_received || self.bytes_sent > previous.bytes_sent
    }

    pub fn both_positive(&self) -> bool {
        self.bytes_received > 0 && self.bytes_sent > 0
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read: {}, write: {}", self.bytes_received, self.bytes_sent)
    }
}

/// Configuration file materialized for one connection attempt
///
/// Transient files are deleted by `remove` (or on drop); caller-owned
/// paths are left alone.
#[derive(Debug)]
pub struct ConfigArtifact {
    path: PathBuf,
    transient: Option<TempPath>,
}

impl ConfigArtifact {
    pub fn transient(temp: TempPath) -> Self {
        Self {
            path: temp.to_path_buf(),
            transient: Some(temp),
        }
    }

    pub fn persisted(path: PathBuf) -> Self {
        Self { path, transient: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(self) -> std::io::Result<()> {
        match self.transient {
            Some(temp) => temp.close(),
            None => Ok(()),
        }
    }
}

/// How one candidate attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Handshake failed or the process exited early
    Failed(String),
    /// Handshake completed but no traffic within the grace period
    Unresponsive,
    /// Reached monitoring and handed control to the operator
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub index: usize,
    pub identifier: String,
    pub outcome: AttemptOutcome,
    pub phases: Vec<SessionPhase>,
}

/// Summary of a completed supervision run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub attempts: Vec<AttemptRecord>,
}

impl RunReport {
    pub fn attempted_identifiers(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.identifier.as_str()).collect()
    }

    pub fn connected(&self) -> Option<&AttemptRecord> {
        self.attempts.iter().find(|a| a.outcome == AttemptOutcome::Connected)
    }
}

/// Result of one operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Quit,
    Status { alive: bool, counters: Counters },
    Unknown(String),
}
