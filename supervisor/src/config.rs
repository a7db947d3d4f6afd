//! Supervisor configuration
//!
//! Timings default to the values the tunnel client is tuned for; tests
//! shrink them through the fluent setters.

use std::path::PathBuf;
use std::time::Duration;

/// How the starting candidate is chosen (applied once per run)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Identifier or fragment of one supplied by the caller
    Explicit(String),
    /// Uniform pick seeded from the current time
    Random,
    /// Ask the operator
    Prompt,
}

/// Liveness monitor timings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Delay before the first read so the artifact can populate
    pub initial_delay: Duration,
    /// Interval between polls; must stay below `dead_timeout`
    pub poll_interval: Duration,
    /// Unchanged counters for longer than this mark the tunnel dead
    pub dead_timeout: Duration,
    /// Sleep after a failed read
    pub error_backoff: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            poll_interval: Duration::from_secs(2),
            dead_timeout: Duration::from_secs(20),
            error_backoff: Duration::from_secs(10),
        }
    }
}

impl MonitorConfig {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_dead_timeout(mut self, timeout: Duration) -> Self {
        self.dead_timeout = timeout;
        self
    }

    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }
}

/// Configuration for one supervision run
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub selection: SelectionPolicy,
    /// Abort on the first failed candidate instead of failing over
    pub single_attempt: bool,
    /// Where the tunnel writes its status artifact
    pub status_path: PathBuf,
    /// Time a fresh connection has to show traffic before it is abandoned
    pub connect_grace: Duration,
    pub monitor: MonitorConfig,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            selection: SelectionPolicy::Prompt,
            single_attempt: false,
            status_path: default_status_path(),
            connect_grace: Duration::from_secs(5),
            monitor: MonitorConfig::default(),
        }
    }
}

impl SupervisorConfig {
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_single_attempt(mut self, single_attempt: bool) -> Self {
        self.single_attempt = single_attempt;
        self
    }

    pub fn with_status_path(mut self, path: PathBuf) -> Self {
        self.status_path = path;
        self
    }

    pub fn with_connect_grace(mut self, grace: Duration) -> Self {
        self.connect_grace = grace;
        self
    }

    pub fn with_monitor(mut self, monitor: MonitorConfig) -> Self {
        self.monitor = monitor;
        self
    }
}

/// Default status artifact location in the system temp directory
pub fn default_status_path() -> PathBuf {
    std::env::temp_dir().join("vpngate-openvpn-status.txt")
}
