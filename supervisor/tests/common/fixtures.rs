//! Test fixtures and data for supervisor tests
//!
//! Consistent candidate lists and timings used across the integration suites.

use base64::Engine;
use std::time::Duration;

use supervisor::{Candidate, MonitorConfig};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const ALPHA: &'static str = "public-vpn-alpha";
    pub const BRAVO: &'static str = "public-vpn-bravo";
    pub const CHARLIE: &'static str = "public-vpn-charlie";

    /// Minimal client configuration carried by every candidate
    pub const CONFIG_TEXT: &'static str = "client\ndev tun\nproto tcp\nremote 203.0.113.10 443\n";

    /// Generous upper bound for a whole test run
    pub const RUN_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn candidate(identifier: &str, country_long: &str, country_short: &str, address: &str) -> Candidate {
        Candidate {
            identifier: identifier.to_string(),
            country_long: country_long.to_string(),
            country_short: country_short.to_string(),
            address: address.to_string(),
            config_payload: base64::engine::general_purpose::STANDARD
                .encode(Self::CONFIG_TEXT)
                .into_bytes(),
        }
    }

    /// Three candidates in list order A, B, C
    pub fn candidates() -> Vec<Candidate> {
        vec![
            Self::candidate(Self::ALPHA, "Japan", "JP", "203.0.113.10"),
            Self::candidate(Self::BRAVO, "Korea", "KR", "203.0.113.20"),
            Self::candidate(Self::CHARLIE, "United States", "US", "203.0.113.30"),
        ]
    }

    /// Monitor timings shrunk for tests; the dead timeout stays long
    pub fn monitor_config() -> MonitorConfig {
        MonitorConfig::default()
            .with_initial_delay(Duration::from_millis(10))
            .with_poll_interval(Duration::from_millis(20))
            .with_dead_timeout(Duration::from_secs(30))
            .with_error_backoff(Duration::from_millis(40))
    }

    /// OpenVPN-style status artifact content
    pub fn status_content(received: u64, sent: u64) -> String {
        format!(
            "OpenVPN STATISTICS\nUpdated,2024-01-01 00:00:00\nTUN/TAP read bytes,{received}\nTUN/TAP write bytes,{sent}\nEND\n"
        )
    }
}
