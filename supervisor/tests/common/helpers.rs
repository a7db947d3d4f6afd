//! Test helpers and builder patterns for supervisor tests
//!
//! The builder wires mocks with permissive defaults so each test only sets
//! up the collaborators it cares about.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::fixtures::TestFixtures;
use ::supervisor::services::TunnelHandle;
use ::supervisor::*;

/// Operator that answers from a script
///
/// When the script runs out (no choice left, no commands left) it either
/// reports failure / end of input or blocks forever, leaving the run to be
/// ended some other way.
pub struct ScriptedOperator {
    choice: Option<String>,
    commands: VecDeque<String>,
    block_when_done: bool,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self {
            choice: None,
            commands: VecDeque::new(),
            block_when_done: false,
        }
    }

    pub fn with_choice(mut self, choice: &str) -> Self {
        self.choice = Some(choice.to_string());
        self
    }

    pub fn with_commands(mut self, commands: &[&str]) -> Self {
        self.commands = commands.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn blocking_when_done(mut self) -> Self {
        self.block_when_done = true;
        self
    }
}

impl Default for ScriptedOperator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    async fn choose_server(&mut self, _candidates: &CandidateList) -> SupervisorResult<String> {
        match self.choice.take() {
            Some(choice) => Ok(choice),
            None if self.block_when_done => std::future::pending().await,
            None => Err(SupervisorError::SelectionFailed {
                message: "no scripted choice".to_string(),
            }),
        }
    }

    async fn read_command(&mut self) -> SupervisorResult<Option<String>> {
        match self.commands.pop_front() {
            Some(command) => Ok(Some(command)),
            None if self.block_when_done => std::future::pending().await,
            None => Ok(None),
        }
    }
}

/// Builder pattern for creating test supervisors with sensible defaults
pub struct SupervisorBuilder<T: TunnelLauncher = MockTunnelLauncher> {
    config: SupervisorConfig,
    provider: MockServerListProvider,
    materializer: MockConfigMaterializer,
    launcher: T,
    notifier: MockNotifier,
    operator: ScriptedOperator,
    _scratch: tempfile::TempDir,
}

impl SupervisorBuilder<MockTunnelLauncher> {
    /// Create a new builder with sensible defaults and basic mock setup
    pub fn new() -> Self {
        let scratch = tempfile::tempdir().unwrap();
        let mut provider = MockServerListProvider::new();
        let mut materializer = MockConfigMaterializer::new();
        let mut notifier = MockNotifier::new();

        provider
            .expect_fetch_candidates()
            .returning(|| Ok(TestFixtures::candidates()))
            .times(0..);

        let config_path = scratch.path().join("client.ovpn");
        materializer
            .expect_materialize()
            .returning(move |_| Ok(ConfigArtifact::persisted(config_path.clone())))
            .times(0..);

        notifier.expect_notify().returning(|_, _| Ok(())).times(0..);

        let config = SupervisorConfig::default()
            .with_selection(SelectionPolicy::Explicit(TestFixtures::ALPHA.to_string()))
            .with_status_path(scratch.path().join("status.txt"))
            .with_connect_grace(Duration::from_secs(2))
            .with_monitor(TestFixtures::monitor_config());

        Self {
            config,
            provider,
            materializer,
            launcher: MockTunnelLauncher::new(),
            notifier,
            operator: ScriptedOperator::new(),
            _scratch: scratch,
        }
    }

    /// Configure the launcher mock with a setup function
    pub fn with_launcher<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockTunnelLauncher),
    {
        setup(&mut self.launcher);
        self
    }

    /// Swap the mock launcher for a real one
    pub fn with_real_launcher<L: TunnelLauncher>(self, launcher: L) -> SupervisorBuilder<L> {
        SupervisorBuilder {
            config: self.config,
            provider: self.provider,
            materializer: self.materializer,
            launcher,
            notifier: self.notifier,
            operator: self.operator,
            _scratch: self._scratch,
        }
    }
}

impl Default for SupervisorBuilder<MockTunnelLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TunnelLauncher> SupervisorBuilder<T> {
    /// Adjust the configuration
    pub fn with_config<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(SupervisorConfig) -> SupervisorConfig,
    {
        self.config = setup(self.config);
        self
    }

    pub fn with_selection(self, selection: SelectionPolicy) -> Self {
        self.with_config(|config| config.with_selection(selection))
    }

    /// Replace the provider mock
    pub fn with_provider<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockServerListProvider),
    {
        let mut provider = MockServerListProvider::new();
        setup(&mut provider);
        self.provider = provider;
        self
    }

    /// Replace the materializer mock
    pub fn with_materializer<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockConfigMaterializer),
    {
        let mut materializer = MockConfigMaterializer::new();
        setup(&mut materializer);
        self.materializer = materializer;
        self
    }

    pub fn with_operator(mut self, operator: ScriptedOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Location the supervisor passes to the tunnel as status artifact
    pub fn status_path(&self) -> PathBuf {
        self.config.status_path.clone()
    }

    /// Scratch directory owned by the built supervisor's test
    pub fn scratch_dir(&self) -> &Path {
        self._scratch.path()
    }

    /// Build the supervisor; the scratch directory lives as long as the guard
    pub fn build(self) -> (TestSupervisor<T>, tempfile::TempDir) {
        let supervisor = Supervisor::new(
            self.config,
            self.provider,
            self.materializer,
            self.launcher,
            self.notifier,
            self.operator,
        );
        (supervisor, self._scratch)
    }
}

/// Type alias for a test supervisor with mock collaborators
pub type TestSupervisor<T = MockTunnelLauncher> =
    Supervisor<MockServerListProvider, MockConfigMaterializer, T, MockNotifier, ScriptedOperator>;

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Launcher outcome that stands up a tunnel with traffic on the status artifact
    pub fn healthy_tunnel(status_path: &Path) -> Result<TunnelHandle, TunnelError> {
        std::fs::write(status_path, TestFixtures::status_content(4096, 2048)).unwrap();
        Ok(TunnelHandle::detached())
    }

    /// Launcher outcome for a tunnel that never moves a byte
    pub fn silent_tunnel() -> Result<TunnelHandle, TunnelError> {
        Ok(TunnelHandle::detached())
    }

    /// Per-candidate connection failure
    pub fn failed_handshake() -> Result<TunnelHandle, TunnelError> {
        Err(TunnelError::HandshakeTimeout {
            timeout: Duration::from_secs(60),
        })
    }

    /// Run to completion with an upper bound so a hang fails the test
    pub async fn run<T: TunnelLauncher>(supervisor: &mut TestSupervisor<T>) -> SupervisorResult<RunReport> {
        tokio::time::timeout(TestFixtures::RUN_TIMEOUT, supervisor.run())
            .await
            .expect("supervisor run should finish")
    }
}
