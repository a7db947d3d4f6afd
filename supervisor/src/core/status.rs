//! Status artifact parser
//!
//! The tunnel rewrites a `label,value` text file at a fixed cadence. Only the
//! two TUN/TAP byte counters matter here; every other line is ignored.

use std::path::Path;

use crate::error::StatusError;
use crate::types::Counters;

pub const READ_BYTES_LABEL: &str = "TUN/TAP read bytes";
pub const WRITE_BYTES_LABEL: &str = "TUN/TAP write bytes";

/// Parse artifact text into counters; absent labels count as zero
pub fn parse_status(content: &str) -> Result<Counters, StatusError> {
    let mut counters = Counters::default();

    for line in content.lines() {
        let mut fields = line.split(',');
        let (Some(label), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
            continue;
        };

        let slot = match label {
            READ_BYTES_LABEL => &mut counters.bytes_received,
            WRITE_BYTES_LABEL => &mut counters.bytes_sent,
            _ => continue,
        };

        let value = value.trim();
        *slot = value.parse().map_err(|_| StatusError::MalformedCounter {
            label: label.to_string(),
            value: value.to_string(),
        })?;
    }

    Ok(counters)
}

/// Read and parse the artifact at `path`
pub async fn read_status(path: &Path) -> Result<Counters, StatusError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            StatusError::NotFound { path: path.to_path_buf() }
        } else {
            StatusError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_status(&content)
}

/// Delete the artifact, treating an already-missing file as success
pub async fn remove_status(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
