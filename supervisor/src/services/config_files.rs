//! Configuration materializer
//!
//! Candidate payloads are base64-encoded OpenVPN configuration files. Each
//! attempt gets its own temporary file, deleted once the attempt is over.

use async_trait::async_trait;
use base64::Engine;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{SupervisorError, SupervisorResult};
use crate::traits::ConfigMaterializer;
use crate::types::{Candidate, ConfigArtifact};
use shared::{component_debug, ComponentId};

const FILE_PREFIX: &str = "vpngate-openvpn-config-";

/// Real materializer writing decoded payloads to temporary files
pub struct Base64ConfigMaterializer {
    /// Directory for the temporary files (system temp dir when unset)
    temp_dir: Option<PathBuf>,
}

impl Base64ConfigMaterializer {
    pub fn new() -> Self {
        Self { temp_dir: None }
    }

    /// Create with custom directory for the temporary files
    pub fn with_temp_dir(temp_dir: PathBuf) -> Self {
        Self { temp_dir: Some(temp_dir) }
    }

    /// Decode a payload, ignoring embedded whitespace and line breaks
    pub fn decode(payload: &[u8]) -> Result<Vec<u8>, base64::DecodeError> {
        let compact: Vec<u8> = payload.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD.decode(compact)
    }

    fn write_transient(&self, contents: &[u8]) -> SupervisorResult<ConfigArtifact> {
        let dir = self.temp_dir.clone().unwrap_or_else(std::env::temp_dir);
        let write_error = |source| SupervisorError::ConfigWrite {
            path: dir.clone(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .tempfile_in(&dir)
            .map_err(write_error)?;
        file.write_all(contents).map_err(write_error)?;
        file.flush().map_err(write_error)?;

        Ok(ConfigArtifact::transient(file.into_temp_path()))
    }
}

impl Default for Base64ConfigMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigMaterializer for Base64ConfigMaterializer {
    async fn materialize(&self, candidate: &Candidate) -> SupervisorResult<ConfigArtifact> {
        let decoded = Self::decode(&candidate.config_payload).map_err(|source| SupervisorError::ConfigDecode {
            identifier: candidate.identifier.clone(),
            source,
        })?;

        let artifact = self.write_transient(&decoded)?;
        component_debug!(
            ComponentId::Supervisor,
            "Wrote configuration for {} to {}",
            candidate.identifier,
            artifact.path().display()
        );
        Ok(artifact)
    }
}
