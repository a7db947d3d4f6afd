//! Main entry point for the vpngate binary
//!
//! Wires the real service implementations into the supervisor and turns the
//! run outcome into the process exit code.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal;

use shared::{component_debug, logging, ComponentId};
use supervisor::{
    config::default_status_path,
    services::{Base64ConfigMaterializer, ConsoleOperator, JsonServerList, LogNotifier, OpenVpnLauncher},
    SelectionPolicy, Supervisor, SupervisorConfig,
};

/// Connect to a public VPN server and keep the tunnel supervised
#[derive(Parser)]
#[command(name = "vpngate")]
#[command(about = "Connects to public VPN servers with automatic failover")]
pub struct Args {
    /// Server to start from: hostname, or a fragment of one
    #[arg(env = "VPNGATE_SERVER", conflicts_with = "random")]
    pub server: Option<String>,

    /// Start from a random server
    #[arg(long, env = "VPNGATE_RANDOM")]
    pub random: bool,

    /// Give up after the first failed server instead of trying the next one
    #[arg(long, env = "VPNGATE_SINGLE_ATTEMPT")]
    pub single_attempt: bool,

    /// Candidate server list (JSON)
    #[arg(long, env = "VPNGATE_SERVERS", default_value = "servers.json")]
    pub servers: PathBuf,

    /// Where OpenVPN writes its status counters
    #[arg(long, env = "VPNGATE_STATUS_FILE")]
    pub status_file: Option<PathBuf>,

    /// OpenVPN executable (defaults to the platform install location)
    #[arg(long, env = "VPNGATE_OPENVPN")]
    pub openvpn: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VPNGATE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    fn selection(&self) -> SelectionPolicy {
        match (&self.server, self.random) {
            (Some(server), _) => SelectionPolicy::Explicit(server.clone()),
            (None, true) => SelectionPolicy::Random,
            (None, false) => SelectionPolicy::Prompt,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenv::dotenv();
    let args = Args::parse();

    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(ComponentId::Supervisor, "vpngate session supervisor");

    let config = SupervisorConfig::default()
        .with_selection(args.selection())
        .with_single_attempt(args.single_attempt)
        .with_status_path(args.status_file.clone().unwrap_or_else(default_status_path));
    component_debug!(
        ComponentId::Supervisor,
        "Servers: {}, status file: {}",
        args.servers.display(),
        config.status_path.display()
    );

    let launcher = match &args.openvpn {
        Some(executable) => OpenVpnLauncher::new().with_executable(executable),
        None => OpenVpnLauncher::new(),
    };

    let mut supervisor = Supervisor::new(
        config,
        JsonServerList::new(args.servers.clone()),
        Base64ConfigMaterializer::new(),
        launcher,
        LogNotifier::new(),
        ConsoleOperator::new(),
    );

    // Set up graceful shutdown
    let shutdown_sender = supervisor.shutdown_sender();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_sender.send(()).await;
            }
            Err(err) => {
                logging::log_error(ComponentId::Supervisor, "Signal handling", &err);
            }
        }
    });

    match supervisor.run().await {
        Ok(report) => {
            component_debug!(ComponentId::Supervisor, "Attempted servers: {:?}", report.attempted_identifiers());
            logging::log_success(ComponentId::Supervisor, "Supervisor stopped gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            logging::log_error(ComponentId::Supervisor, "Supervisor run", &e);
            ExitCode::from(e.exit_code())
        }
    }
}
