//! VPN session supervisor
//!
//! Picks a public VPN server from a candidate list, drives the OpenVPN client
//! through connection attempts with failover, watches tunnel liveness through
//! the client's status artifact and serves a small interactive command loop.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod supervisor;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{MonitorConfig, SelectionPolicy, SupervisorConfig};
pub use core::{Liveness, LivenessSnapshot, Session, SessionPhase};
pub use error::{StatusError, SupervisorError, SupervisorResult, TunnelError};
pub use supervisor::Supervisor;
pub use traits::{
    ConfigMaterializer, MockConfigMaterializer, MockNotifier, MockOperator, MockServerListProvider,
    MockTunnelLauncher, Notifier, Operator, ServerListProvider, TunnelLauncher,
};
pub use types::{
    AttemptOutcome, AttemptRecord, Candidate, CandidateList, CommandOutcome, ConfigArtifact, Counters,
    RunReport,
};
