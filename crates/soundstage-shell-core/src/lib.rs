//! Soundstage shell core - platform-independent backend supervision
//!
//! This crate provides the configuration, error types, readiness probe,
//! backend supervisor and lifecycle coordinator that are shared across
//! platform-specific process-manager implementations.

pub mod binary;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod probe;
pub mod process;
pub mod supervisor;

pub use binary::{resolve_server_binary, server_binary_name};
pub use config::*;
pub use error::*;
pub use events::*;
pub use lifecycle::*;
pub use probe::*;
pub use process::*;
pub use supervisor::*;
