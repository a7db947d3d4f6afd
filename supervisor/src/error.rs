//! Supervisor error types

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

use crate::core::session::SessionPhase;

/// Failures reading the tunnel's status artifact
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Status artifact not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Malformed counter '{label}': {value:?}")]
    MalformedCounter { label: String, value: String },

    #[error("Failed to read status artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the external tunnel process
#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("{executable} is required, please install it")]
    ExecutableNotFound { executable: String },

    #[error("Failed to start tunnel process: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("Tunnel process exited before the handshake completed: {status}")]
    EarlyExit { status: ExitStatus },

    #[error("Handshake did not complete within {timeout:?}")]
    HandshakeTimeout { timeout: Duration },

    #[error("Failed to terminate tunnel process {pid}: {message}")]
    Terminate { pid: u32, message: String },

    #[error("Tunnel process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TunnelError {
    /// Whether this failure ends the whole run instead of just the current candidate
    pub fn is_fatal(&self) -> bool {
        matches!(self, TunnelError::ExecutableNotFound { .. })
    }
}

/// Everything a supervision run can fail with
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Server list provider failed: {message}")]
    ProviderFailed { message: String },

    #[error("Server list is empty")]
    NoCandidates,

    #[error("Invalid server list: {reason}")]
    InvalidCandidateList { reason: String },

    #[error("Server '{selection}' was not found")]
    ServerNotFound { selection: String },

    #[error("Unable to obtain a server selection: {message}")]
    SelectionFailed { message: String },

    #[error("Failed to decode configuration for {identifier}: {source}")]
    ConfigDecode {
        identifier: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Failed to write configuration file {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tunnel error: {0}")]
    Tunnel(#[from] TunnelError),

    #[error("Disconnect failed: {source}")]
    DisconnectFailed {
        #[source]
        source: TunnelError,
    },

    #[error("Connection to {identifier} failed in single-attempt mode: {reason}")]
    SingleAttemptFailed { identifier: String, reason: String },

    #[error("All {attempted} candidate servers failed")]
    CandidatesExhausted { attempted: usize },

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: SessionPhase, to: SessionPhase },

    #[error("Failed to read operator input: {source}")]
    OperatorInput {
        #[source]
        source: std::io::Error,
    },

    #[error("Interrupted before a session was established")]
    Interrupted,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SupervisorError {
    pub fn provider(message: impl Into<String>) -> Self {
        SupervisorError::ProviderFailed { message: message.into() }
    }

    pub fn invalid_list(reason: impl Into<String>) -> Self {
        SupervisorError::InvalidCandidateList { reason: reason.into() }
    }

    /// Process exit status for this error at the top-level handler
    pub fn exit_code(&self) -> u8 {
        match self {
            SupervisorError::Interrupted => 130,
            _ => 1,
        }
    }
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;
