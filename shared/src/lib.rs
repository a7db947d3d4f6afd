//! Shared utilities for the VPN session supervisor workspace
//!
//! Holds the pieces every crate needs: component identifiers and the
//! tracing setup with component-aware logging macros.

pub mod logging;
pub mod types;

pub use types::*;
