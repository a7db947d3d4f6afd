//! Log-backed notifier

use crate::error::SupervisorResult;
use crate::traits::Notifier;
use shared::{component_info, ComponentId};

/// Notifier that records alerts in the log stream
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) -> SupervisorResult<()> {
        component_info!(ComponentId::Notifier, "🔔 {}: {}", title, message);
        Ok(())
    }
}
