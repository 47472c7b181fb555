//! Logging utilities.
//!
//! This module centralizes logger initialization. Everything else logs through
//! the standard `log` facade; the station binary and the telemetry crate never
//! touch `env_logger` directly.

mod init;

pub use init::{init_logging, LoggingConfig};
