//! Service implementations
//!
//! Real implementations of the collaborator traits plus the tunnel process
//! controller and the liveness monitor task.

pub mod config_files;
pub mod console;
pub mod monitor;
pub mod notifier;
pub mod server_list;
pub mod tunnel;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use config_files::Base64ConfigMaterializer;
pub use console::ConsoleOperator;
pub use monitor::{LivenessMonitor, MonitorHandle};
pub use notifier::LogNotifier;
pub use server_list::JsonServerList;
pub use tunnel::{OpenVpnLauncher, TunnelHandle};
