//! JSON server list provider
//!
//! Reads candidates from a local JSON array. Each record carries the
//! hostname, country, address and the base64 configuration payload.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{SupervisorError, SupervisorResult};
use crate::traits::ServerListProvider;
use crate::types::Candidate;

/// On-disk record shape
#[derive(Debug, Deserialize)]
struct ServerRecord {
    hostname: String,
    #[serde(default)]
    country_long: String,
    #[serde(default)]
    country_short: String,
    #[serde(default)]
    ip: String,
    config_base64: String,
}

impl From<ServerRecord> for Candidate {
    fn from(record: ServerRecord) -> Self {
        Candidate {
            identifier: record.hostname,
            country_long: record.country_long,
            country_short: record.country_short,
            address: record.ip,
            config_payload: record.config_base64.into_bytes(),
        }
    }
}

/// Real provider backed by a JSON file
pub struct JsonServerList {
    path: PathBuf,
}

impl JsonServerList {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parse list contents
    pub fn parse(content: &str) -> SupervisorResult<Vec<Candidate>> {
        let records: Vec<ServerRecord> = serde_json::from_str(content)
            .map_err(|e| SupervisorError::provider(format!("Invalid server list: {e}")))?;
        Ok(records.into_iter().map(Candidate::from).collect())
    }
}

#[async_trait]
impl ServerListProvider for JsonServerList {
    async fn fetch_candidates(&self) -> SupervisorResult<Vec<Candidate>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SupervisorError::provider(format!("Unable to read {}: {e}", self.path.display()))
        })?;
        Self::parse(&content)
    }
}
