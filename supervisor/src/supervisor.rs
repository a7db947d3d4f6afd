//! Session supervisor
//!
//! Selects a starting candidate, walks the list attempting connections,
//! keeps the first healthy tunnel under a liveness monitor and then serves
//! operator commands until the session is disconnected.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::{SelectionPolicy, SupervisorConfig};
use crate::core::selection::{find_candidate, random_index, time_seed};
use crate::core::session::{Session, SessionPhase};
use crate::core::status::{read_status, remove_status};
use crate::error::{SupervisorError, SupervisorResult};
use crate::services::monitor::{LivenessMonitor, MonitorHandle};
use crate::services::tunnel::TunnelHandle;
use crate::traits::{ConfigMaterializer, Notifier, Operator, ServerListProvider, TunnelLauncher};
use crate::types::{AttemptOutcome, AttemptRecord, Candidate, CandidateList, CommandOutcome, RunReport};
use shared::{component_debug, component_error, component_info, component_warn, logging, ComponentId};

/// What woke the command loop
enum LoopEvent {
    Command(Option<String>),
    LivenessChanged,
    LivenessClosed,
    Shutdown,
}

/// Supervises one tunnel session across the candidate list
pub struct Supervisor<P, D, T, N, O>
where
    P: ServerListProvider,
    D: ConfigMaterializer,
    T: TunnelLauncher,
    N: Notifier + 'static,
    O: Operator,
{
    config: SupervisorConfig,

    /// Injected services
    provider: P,
    materializer: D,
    launcher: T,
    notifier: Arc<N>,
    operator: O,

    /// Shutdown signal
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<P, D, T, N, O> Supervisor<P, D, T, N, O>
where
    P: ServerListProvider,
    D: ConfigMaterializer,
    T: TunnelLauncher,
    N: Notifier + 'static,
    O: Operator,
{
    /// Create new supervisor with injected dependencies
    pub fn new(config: SupervisorConfig, provider: P, materializer: D, launcher: T, notifier: N, operator: O) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        Self {
            config,
            provider,
            materializer,
            launcher,
            notifier: Arc::new(notifier),
            operator,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Sender that interrupts the run (Ctrl+C wiring)
    pub fn shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run selection, failover and the command loop to completion
    ///
    /// Returns only after the operator disconnected a healthy session; every
    /// other ending is an error for the caller to turn into an exit code.
    pub async fn run(&mut self) -> SupervisorResult<RunReport> {
        let candidates = CandidateList::new(self.provider.fetch_candidates().await?)?;
        if candidates.is_empty() {
            return Err(SupervisorError::NoCandidates);
        }
        component_debug!(ComponentId::Supervisor, "Loaded {} candidate servers", candidates.len());

        let start = self.select_start(&candidates).await?;
        let total = candidates.len();
        let mut report = RunReport::default();

        for index in start..total {
            let Some(candidate) = candidates.get(index) else { break };
            let mut session = Session::new(index, candidate.identifier.clone());

            let attempt = self.attempt(&mut session, candidate, total).await?;
            let record = |outcome| AttemptRecord {
                index,
                identifier: candidate.identifier.clone(),
                outcome,
                phases: session.history().to_vec(),
            };

            let Some((tunnel, monitor)) = attempt else {
                let outcome = match session.phase() {
                    SessionPhase::Failed => AttemptOutcome::Failed(format!("connection to {} failed", candidate.identifier)),
                    _ => AttemptOutcome::Unresponsive,
                };
                report.attempts.push(record(outcome));

                if self.config.single_attempt {
                    return Err(SupervisorError::SingleAttemptFailed {
                        identifier: candidate.identifier.clone(),
                        reason: format!("session ended {}", session.phase()),
                    });
                }
                continue;
            };

            report.attempts.push(record(AttemptOutcome::Connected));
            self.command_loop(&mut session, tunnel, monitor).await?;
            if let Some(last) = report.attempts.last_mut() {
                last.phases = session.history().to_vec();
            }
            return Ok(report);
        }

        component_error!(ComponentId::Supervisor, "❌ No server could be connected");

        Err(SupervisorError::CandidatesExhausted {
            attempted: report.attempts.len(),
        })
    }

    /// Resolve the starting index from the selection policy
    async fn select_start(&mut self, candidates: &CandidateList) -> SupervisorResult<usize> {
        let selection = match &self.config.selection {
            SelectionPolicy::Random => {
                let index = random_index(candidates.len(), time_seed());
                component_debug!(ComponentId::Supervisor, "🎲 Randomly selected candidate {}", index + 1);
                return Ok(index);
            }
            SelectionPolicy::Explicit(selection) => selection.clone(),
            SelectionPolicy::Prompt => tokio::select! {
                choice = self.operator.choose_server(candidates) => choice?,
                _ = self.shutdown_rx.recv() => {
                    logging::log_shutdown(ComponentId::Supervisor, "interrupted at server selection");
                    return Err(SupervisorError::Interrupted);
                }
            },
        };

        let found = find_candidate(candidates, &selection)?;
        if found.other_matches > 0 {
            component_warn!(
                ComponentId::Supervisor,
                "'{}' also matches {} later servers, using the first in list order",
                selection,
                found.other_matches
            );
        }
        Ok(found.index)
    }

    /// One connection attempt
    ///
    /// `Ok(Some(..))` hands back a healthy tunnel under monitoring, `Ok(None)`
    /// means this candidate is abandoned, `Err` is fatal to the run.
    async fn attempt(
        &mut self,
        session: &mut Session,
        candidate: &Candidate,
        total: usize,
    ) -> SupervisorResult<Option<(TunnelHandle, MonitorHandle)>> {
        session.advance(SessionPhase::Connecting)?;

        let artifact = self.materializer.materialize(candidate).await?;

        component_info!(
            ComponentId::Supervisor,
            "Trying server {:<16} country {} [ {}/{} ]",
            candidate.identifier,
            candidate.country_short,
            session.candidate_index() + 1,
            total
        );

        let started = tokio::select! {
            result = self.launcher.start(artifact.path(), &self.config.status_path) => Some(result),
            _ = self.shutdown_rx.recv() => None,
        };

        if let Err(e) = artifact.remove() {
            component_warn!(ComponentId::Supervisor, "Could not remove temporary config: {}", e);
        }

        let Some(started) = started else {
            logging::log_shutdown(ComponentId::Supervisor, "interrupted while connecting");
            self.cleanup_status().await;
            return Err(SupervisorError::Interrupted);
        };

        let mut tunnel = match started {
            Ok(tunnel) => tunnel,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                session.advance(SessionPhase::Failed)?;
                component_error!(ComponentId::Supervisor, "❌ Connection to {} failed: {}", candidate.identifier, e);
                self.cleanup_status().await;
                return Ok(None);
            }
        };

        session.advance(SessionPhase::Connected)?;
        component_info!(
            ComponentId::Supervisor,
            "Connected to {} ({}) {} ({}/{})",
            candidate.identifier,
            candidate.address,
            candidate.country_long,
            session.candidate_index() + 1,
            total
        );
        if let Some(pid) = tunnel.pid() {
            component_debug!(ComponentId::Supervisor, "Tunnel process {} owned by session {}", pid, session.id());
        }

        let monitor = LivenessMonitor::new(
            self.config.status_path.clone(),
            self.config.monitor.clone(),
            Arc::clone(&self.notifier),
        )
        .spawn();
        session.advance(SessionPhase::Monitoring)?;

        if monitor.wait_until_alive(self.config.connect_grace).await {
            return Ok(Some((tunnel, monitor)));
        }

        session.advance(SessionPhase::Degraded)?;
        component_warn!(
            ComponentId::Supervisor,
            "No traffic from {} within {:?}, moving on",
            candidate.identifier,
            self.config.connect_grace
        );

        monitor.stop().await;
        tunnel
            .stop()
            .await
            .map_err(|source| SupervisorError::DisconnectFailed { source })?;
        self.cleanup_status().await;
        session.advance(SessionPhase::Disconnected)?;
        Ok(None)
    }

    /// Serve operator commands until quit, end of input or shutdown
    async fn command_loop(
        &mut self,
        session: &mut Session,
        tunnel: TunnelHandle,
        monitor: MonitorHandle,
    ) -> SupervisorResult<()> {
        component_info!(ComponentId::Supervisor, "Type 'q' or 'quit' to disconnect and exit");

        let mut liveness = monitor.subscribe();
        let mut liveness_open = true;
        let mut input_error = None;

        loop {
            let event = tokio::select! {
                line = self.operator.read_command() => match line {
                    Ok(line) => LoopEvent::Command(line),
                    Err(e) => {
                        input_error = Some(e);
                        break;
                    }
                },
                changed = liveness.changed(), if liveness_open => match changed {
                    Ok(()) => LoopEvent::LivenessChanged,
                    Err(_) => LoopEvent::LivenessClosed,
                },
                _ = self.shutdown_rx.recv() => LoopEvent::Shutdown,
            };

            match event {
                LoopEvent::Command(None) => {
                    component_debug!(ComponentId::Supervisor, "End of operator input");
                    break;
                }
                LoopEvent::Command(Some(line)) => {
                    if self.handle_command(&line, &monitor).await? == CommandOutcome::Quit {
                        break;
                    }
                }
                LoopEvent::LivenessChanged => {
                    let alive = liveness.borrow_and_update().is_alive();
                    Self::track_liveness(session, alive)?;
                }
                LoopEvent::LivenessClosed => liveness_open = false,
                LoopEvent::Shutdown => {
                    logging::log_shutdown(ComponentId::Supervisor, "Received Ctrl+C signal");
                    break;
                }
            }
        }

        self.disconnect(session, tunnel, monitor).await?;
        match input_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn track_liveness(session: &mut Session, alive: bool) -> SupervisorResult<()> {
        match (session.phase(), alive) {
            (SessionPhase::Monitoring, false) => {
                session.advance(SessionPhase::Degraded)?;
                component_warn!(ComponentId::Supervisor, "⚠️ VPN connection lost, type 'status' or 'quit'");
            }
            (SessionPhase::Degraded, true) => {
                session.advance(SessionPhase::Monitoring)?;
                component_info!(ComponentId::Supervisor, "VPN connection restored");
            }
            _ => {}
        }
        Ok(())
    }

    /// Execute one operator command
    pub async fn handle_command(&self, line: &str, monitor: &MonitorHandle) -> SupervisorResult<CommandOutcome> {
        let command = line.trim().to_lowercase();

        match command.as_str() {
            "q" | "quit" => Ok(CommandOutcome::Quit),
            "status" => {
                let snapshot = monitor.snapshot();
                let counters = match read_status(&self.config.status_path).await {
                    Ok(counters) => counters,
                    Err(e) => {
                        component_warn!(ComponentId::Supervisor, "Unable to read VPN status: {}", e);
                        snapshot.counters
                    }
                };

                if snapshot.is_alive() {
                    component_info!(ComponentId::Supervisor, "VPN connection healthy {}", counters);
                } else {
                    self.cleanup_status().await;
                    component_warn!(ComponentId::Supervisor, "VPN connection down {}", counters);
                }

                Ok(CommandOutcome::Status {
                    alive: snapshot.is_alive(),
                    counters,
                })
            }
            _ => {
                component_info!(ComponentId::Supervisor, "Unknown command. Available commands: quit, status");
                Ok(CommandOutcome::Unknown(line.to_string()))
            }
        }
    }

    async fn disconnect(&self, session: &mut Session, mut tunnel: TunnelHandle, monitor: MonitorHandle) -> SupervisorResult<()> {
        component_debug!(
            ComponentId::Supervisor,
            "Disconnecting session {} to {} (up since {})",
            session.id(),
            session.identifier(),
            session.started_at().format("%H:%M:%S")
        );

        monitor.stop().await;
        tunnel
            .stop()
            .await
            .map_err(|source| SupervisorError::DisconnectFailed { source })?;
        self.cleanup_status().await;
        session.advance(SessionPhase::Disconnected)?;

        logging::log_success(ComponentId::Supervisor, "VPN disconnected");
        Ok(())
    }

    async fn cleanup_status(&self) {
        if let Err(e) = remove_status(&self.config.status_path).await {
            component_warn!(ComponentId::Supervisor, "Could not remove status artifact: {}", e);
        }
    }
}
