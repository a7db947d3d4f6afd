//! Background liveness monitor
//!
//! Polls the status artifact, feeds the tracker and publishes snapshots on a
//! watch channel. The task lives exactly as long as its `MonitorHandle`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::MonitorConfig;
use crate::core::liveness::{LivenessEvent, LivenessSnapshot, LivenessTracker};
use crate::core::status::read_status;
use crate::error::StatusError;
use crate::traits::Notifier;
use crate::types::Counters;
use shared::{component_debug, component_error, component_info, component_warn, ComponentId};

pub const NOTIFICATION_TITLE: &str = "VPN server";
pub const CONNECTED_MESSAGE: &str = "Connected";
pub const DISCONNECTED_MESSAGE: &str = "Connection lost";

/// Liveness monitor for one session
pub struct LivenessMonitor<N: Notifier + 'static> {
    status_path: PathBuf,
    config: MonitorConfig,
    notifier: Arc<N>,
}

impl<N: Notifier + 'static> LivenessMonitor<N> {
    pub fn new(status_path: PathBuf, config: MonitorConfig, notifier: Arc<N>) -> Self {
        Self {
            status_path,
            config,
            notifier,
        }
    }

    /// Start polling in the background
    pub fn spawn(self) -> MonitorHandle {
        let (state_tx, state_rx) = watch::channel(LivenessSnapshot::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(self.run(state_tx, shutdown_rx));

        MonitorHandle {
            state: state_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    async fn run(self, state_tx: watch::Sender<LivenessSnapshot>, mut shutdown: oneshot::Receiver<()>) {
        let mut tracker = LivenessTracker::new(self.config.dead_timeout, Instant::now().into_std());

        tokio::select! {
            _ = tokio::time::sleep(self.config.initial_delay) => {}
            _ = &mut shutdown => return,
        }

        component_debug!(ComponentId::Monitor, "Watching {}", self.status_path.display());

        loop {
            let pause = match read_status(&self.status_path).await {
                Ok(counters) => {
                    self.observe(&mut tracker, counters, &state_tx);
                    self.config.poll_interval
                }
                Err(StatusError::NotFound { .. }) => {
                    // Not written yet, or removed after a dead session
                    self.observe(&mut tracker, Counters::default(), &state_tx);
                    self.config.poll_interval
                }
                Err(e) => {
                    component_error!(ComponentId::Monitor, "Unable to read OpenVPN status file: {}", e);
                    self.config.error_backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = &mut shutdown => break,
            }
        }

        component_debug!(ComponentId::Monitor, "Liveness monitor stopped");
    }

    fn observe(&self, tracker: &mut LivenessTracker, counters: Counters, state_tx: &watch::Sender<LivenessSnapshot>) {
        let event = tracker.observe(counters, Instant::now().into_std());
        let snapshot = tracker.snapshot();

        state_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });

        match event {
            Some(LivenessEvent::Connected) => {
                component_info!(ComponentId::Monitor, "Tunnel carrying traffic ({})", snapshot.counters);
                self.deliver(CONNECTED_MESSAGE);
            }
            Some(LivenessEvent::Disconnected) => {
                component_warn!(
                    ComponentId::Monitor,
                    "No traffic for {:?}, tunnel considered dead ({})",
                    self.config.dead_timeout,
                    snapshot.counters
                );
                self.deliver(DISCONNECTED_MESSAGE);
            }
            None => {}
        }
    }

    fn deliver(&self, message: &str) {
        if let Err(e) = self.notifier.notify(NOTIFICATION_TITLE, message) {
            component_error!(ComponentId::Monitor, "Unable to send notification: {}", e);
        }
    }
}

/// Owner of a running monitor task
///
/// Dropping the handle aborts the task; `stop` shuts it down and waits.
pub struct MonitorHandle {
    state: watch::Receiver<LivenessSnapshot>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Latest published state
    pub fn snapshot(&self) -> LivenessSnapshot {
        *self.state.borrow()
    }

    /// Receiver notified whenever the published state changes
    pub fn subscribe(&self) -> watch::Receiver<LivenessSnapshot> {
        self.state.clone()
    }

    /// Wait until the tunnel is seen alive, giving up after `within`
    pub async fn wait_until_alive(&self, within: Duration) -> bool {
        let mut state = self.state.clone();
        let alive = tokio::time::timeout(within, state.wait_for(|s| s.is_alive()))
            .await
            .is_ok_and(|seen| seen.is_ok());
        alive
    }

    /// Signal the task to stop and wait for it to finish
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                component_error!(ComponentId::Monitor, "Liveness monitor task failed: {}", e);
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
