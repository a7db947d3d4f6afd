//! Common test utilities and infrastructure
//!
//! Shared fixtures, scripted collaborators and the supervisor builder used
//! across the integration suites.

#![allow(dead_code)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{ScriptedOperator, SupervisorBuilder, TestHelpers};
