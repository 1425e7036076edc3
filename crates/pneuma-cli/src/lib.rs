//! Pneuma host library
//!
//! The pieces behind the `pneuma` binary:
//! - Layered configuration
//! - Trust registry persistence and bookkeeping
//! - A headless session driver on real or virtual time

pub mod config;
pub mod error;
pub mod registry;
pub mod session;

pub use config::PneumaConfig;
pub use error::{CliError, CliResult};
pub use session::{SessionOptions, SessionRunner, SessionSummary, StopReason};
