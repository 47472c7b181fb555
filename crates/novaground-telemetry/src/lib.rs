//! Telemetry model, simulated source, logging and playback for **NovaGround**.
//!
//! This crate has no GPU or windowing dependencies so it can be consumed by
//! headless tools as well as the station binary.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`data`] | `TelemetryData`, `StatusFlags`, `Limits` |
//! | [`mission`] | `MissionPhase`, `Command`, `MissionControl` |
//! | [`source`] | `TelemetrySource` trait, `ConnectionStatus` |
//! | [`sim`] | `Simulation` flight model, `SimulatedBackend` |
//! | [`logger`] | `DataLogger`, `LogRecord` (JSON lines) |
//! | [`playback`] | `Playback` of a recorded log |
//! | [`config`] | `StationConfig` |
//! | [`error`] | `TelemetryError` |
//!
//! # Quick start
//!
//! ```rust
//! use novaground_telemetry::mission::{Command, MissionPhase};
//! use novaground_telemetry::sim::Simulation;
//!
//! let mut sim = Simulation::seeded(7);
//! assert!(sim.apply(Command::StartMission));
//! for _ in 0..10 {
//!     sim.step(0.1, chrono::Utc::now());
//! }
//! assert_eq!(sim.snapshot().phase, MissionPhase::Launching);
//! assert!(sim.snapshot().altitude > 0.0);
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod logger;
pub mod mission;
pub mod playback;
pub mod sim;
pub mod source;

pub use config::StationConfig;
pub use data::{Limits, StatusFlags, TelemetryData};
pub use error::TelemetryError;
pub use mission::{ArmState, Command, MissionControl, MissionPhase, PanelStatus};
pub use source::{ConnectionStatus, TelemetrySource};

use std::sync::{Mutex, MutexGuard};

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// Telemetry state stays usable after a panicking worker; the panic itself is
/// reported by the thread that raised it.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
