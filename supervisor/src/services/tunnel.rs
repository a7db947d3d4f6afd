//! OpenVPN process controller
//!
//! Spawns the tunnel binary with a fixed argument set, scans stdout for the
//! handshake marker and hands back a handle owning the running process.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use crate::core::status::remove_status;
use crate::error::TunnelError;
use crate::traits::TunnelLauncher;
use shared::{component_debug, component_warn, ComponentId};

/// Line printed by OpenVPN once the tunnel is up
pub const HANDSHAKE_MARKER: &str = "Initialization Sequence Completed";

#[cfg(windows)]
const DEFAULT_EXECUTABLE: &str = "C:\\Program Files\\OpenVPN\\bin\\openvpn.exe";
#[cfg(not(windows))]
const DEFAULT_EXECUTABLE: &str = "openvpn";

/// Status artifact refresh interval in seconds
const STATUS_REFRESH_SECS: &str = "2";

/// Real launcher for the OpenVPN client
pub struct OpenVpnLauncher {
    executable: PathBuf,
    handshake_timeout: Duration,
    terminate_grace: Duration,
}

impl OpenVpnLauncher {
    /// Create launcher for the platform's OpenVPN binary
    pub fn new() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            handshake_timeout: Duration::from_secs(60),
            terminate_grace: Duration::from_secs(5),
        }
    }

    /// Use a different binary (fluent API)
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Configure handshake timeout (fluent API)
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Configure how long `stop` waits after SIGTERM (fluent API)
    pub fn with_terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }

    /// Fixed argument list for one connection attempt
    #[rustfmt::skip]
    pub fn build_args(config_path: &Path, status_path: &Path) -> Vec<String> {
        let config = config_path.display().to_string();
        let status = status_path.display().to_string();

        [
            "--verb", "4",
            "--config", config.as_str(),
            "--data-ciphers", "AES-128-CBC",
            "--remote-cert-tls", "server",
            "--connect-retry-max", "2",
            "--disable-dco",
            "--session-timeout", "infinite",
            "--ping-exit", "5",
            "--ping-restart", "2",
            "--connect-timeout", "2",
            "--status", status.as_str(), STATUS_REFRESH_SECS,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Locate the executable: absolute paths must exist, bare names go through PATH
    fn resolve_executable(&self) -> Result<PathBuf, TunnelError> {
        let not_found = || TunnelError::ExecutableNotFound {
            executable: self.executable.display().to_string(),
        };

        if self.executable.is_absolute() {
            return if self.executable.is_file() {
                Ok(self.executable.clone())
            } else {
                Err(not_found())
            };
        }

        which::which(&self.executable).map_err(|_| not_found())
    }

    /// Read stdout until the marker shows up or the stream closes
    async fn await_marker(lines: &mut tokio::io::Lines<BufReader<ChildStdout>>) -> Result<bool, TunnelError> {
        while let Some(line) = lines.next_line().await? {
            component_debug!(ComponentId::Tunnel, "{}", line);
            if line.contains(HANDSHAKE_MARKER) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for OpenVpnLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TunnelLauncher for OpenVpnLauncher {
    async fn start(&self, config_path: &Path, status_path: &Path) -> Result<TunnelHandle, TunnelError> {
        // Stale counters from a previous run would fake liveness
        remove_status(status_path).await?;

        let executable = self.resolve_executable()?;
        let args = Self::build_args(config_path, status_path);

        component_debug!(
            ComponentId::Tunnel,
            "Executing {} {}",
            executable.display(),
            args.join(" ")
        );

        let mut child = Command::new(&executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TunnelError::Spawn { source })?;

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    component_warn!(ComponentId::Tunnel, "{}", line);
                }
            })
        });

        let Some(stdout) = child.stdout.take() else {
            return Err(TunnelError::Io(std::io::Error::other("tunnel stdout was not captured")));
        };
        let mut lines = BufReader::new(stdout).lines();

        // A child that closes stdout but keeps running must not outlive the timeout either
        let handshake = async {
            if Self::await_marker(&mut lines).await? {
                return Ok::<(), TunnelError>(());
            }
            let status = child.wait().await?;
            component_debug!(ComponentId::Tunnel, "Tunnel process finished with {}", status);
            Err(TunnelError::EarlyExit { status })
        };
        let outcome = tokio::time::timeout(self.handshake_timeout, handshake).await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                let _ = child.kill().await;
                return Err(TunnelError::HandshakeTimeout {
                    timeout: self.handshake_timeout,
                });
            }
        }

        component_debug!(ComponentId::Tunnel, "OpenVPN connection established");

        // Keep draining so the process never blocks on a full pipe
        let stdout_task = tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                component_debug!(ComponentId::Tunnel, "{}", line);
            }
        });

        let mut drains = vec![stdout_task];
        drains.extend(stderr_task);

        Ok(TunnelHandle {
            child: Some(child),
            drains,
            terminate_grace: self.terminate_grace,
        })
    }
}

/// Owns a running tunnel process
///
/// Dropping the handle kills the process; `stop` terminates it gracefully
/// and reaps it.
#[derive(Debug)]
pub struct TunnelHandle {
    child: Option<Child>,
    drains: Vec<JoinHandle<()>>,
    terminate_grace: Duration,
}

impl TunnelHandle {
    /// Handle with no process behind it; `stop` is a no-op
    pub fn detached() -> Self {
        Self {
            child: None,
            drains: Vec::new(),
            terminate_grace: Duration::ZERO,
        }
    }

    /// OS process id while the process is owned
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(|c| c.id())
    }

    /// Whether a process is owned and has not exited yet
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Terminate the owned process; idempotent
    pub async fn stop(&mut self) -> Result<(), TunnelError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        if let Some(pid) = child.id() {
            request_termination(&mut child, pid)?;
            match tokio::time::timeout(self.terminate_grace, child.wait()).await {
                Ok(status) => {
                    component_debug!(ComponentId::Tunnel, "🛑 Tunnel process {} exited: {:?}", pid, status);
                }
                Err(_) => {
                    component_warn!(
                        ComponentId::Tunnel,
                        "Tunnel process {} ignored termination for {:?}, killing",
                        pid,
                        self.terminate_grace
                    );
                    child.kill().await.map_err(|e| TunnelError::Terminate {
                        pid,
                        message: e.to_string(),
                    })?;
                }
            }
        } else {
            // Already reaped; nothing left to signal
            let _ = child.wait().await;
        }

        for drain in self.drains.drain(..) {
            drain.abort();
        }
        Ok(())
    }
}

#[cfg(unix)]
fn request_termination(_child: &mut Child, pid: u32) -> Result<(), TunnelError> {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(TunnelError::Terminate {
            pid,
            message: e.to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child, pid: u32) -> Result<(), TunnelError> {
    child.start_kill().map_err(|e| TunnelError::Terminate {
        pid,
        message: e.to_string(),
    })
}
