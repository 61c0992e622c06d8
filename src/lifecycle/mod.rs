//! Runtime wiring and process setup.
//!
//! - [`ManagerSystem`] - Starts the collaborators and hands out clients
//! - [`ManagerConfig`] - Settings read from the process environment
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod config;
pub mod manager_system;
pub mod tracing;

pub use config::*;
pub use manager_system::*;
pub use tracing::*;
