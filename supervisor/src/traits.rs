//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the supervisor talks to sits behind one of these
//! traits so runs can be driven end to end with mocks.

use std::path::Path;

use crate::error::{SupervisorResult, TunnelError};
use crate::services::tunnel::TunnelHandle;
use crate::types::{Candidate, CandidateList, ConfigArtifact};

/// Source of the candidate server list
///
/// Fetches and filters the public relay directory once per run.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ServerListProvider: Send + Sync {
    /// Fetch the candidate list
    ///
    /// # Returns
    /// Candidates in directory order, or an error that ends the run
    async fn fetch_candidates(&self) -> SupervisorResult<Vec<Candidate>>;
}

/// Turns a candidate's opaque payload into a configuration file
///
/// Each attempt gets a fresh artifact that is removed when the session ends.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ConfigMaterializer: Send + Sync {
    /// Decode and write the configuration
    ///
    /// # Parameters
    /// - `candidate`: Server whose payload is decoded
    ///
    /// # Returns
    /// Artifact describing the written file, or an error that ends the run
    async fn materialize(&self, candidate: &Candidate) -> SupervisorResult<ConfigArtifact>;
}

/// Starts the external tunnel process
#[mockall::automock]
#[async_trait::async_trait]
pub trait TunnelLauncher: Send + Sync {
    /// Start the tunnel and wait for the handshake marker
    ///
    /// # Parameters
    /// - `config_path`: Configuration file written for this attempt
    /// - `status_path`: Where the process keeps its status artifact
    ///
    /// # Returns
    /// Handle owning the still-running process once the handshake completes.
    /// `TunnelError::is_fatal` tells a missing binary from a failed attempt.
    async fn start(&self, config_path: &Path, status_path: &Path) -> Result<TunnelHandle, TunnelError>;
}

/// One-way sink for user-facing alerts
#[mockall::automock]
pub trait Notifier: Send + Sync {
    /// Deliver a notification
    ///
    /// # Parameters
    /// - `title`: Short headline
    /// - `message`: Body text
    ///
    /// # Returns
    /// Delivery result; callers log failures and move on
    fn notify(&self, title: &str, message: &str) -> SupervisorResult<()>;
}

/// The human at the console
///
/// Answers the server menu and feeds the command loop.
#[mockall::automock]
#[async_trait::async_trait]
pub trait Operator: Send {
    /// Ask for a server when none was given on the command line
    ///
    /// # Parameters
    /// - `candidates`: Servers offered in the menu
    ///
    /// # Returns
    /// Hostname or hostname fragment to look up in the list
    async fn choose_server(&mut self, candidates: &CandidateList) -> SupervisorResult<String>;

    /// Read the next command line
    ///
    /// Must be safe to cancel and call again while waiting for input.
    ///
    /// # Returns
    /// The line without its terminator, or `None` at end of input
    async fn read_command(&mut self) -> SupervisorResult<Option<String>>;
}
