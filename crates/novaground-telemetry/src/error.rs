use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::mission::Command;

/// Errors raised by telemetry sources, logging, playback and configuration.
#[derive(Debug)]
pub enum TelemetryError {
    /// Filesystem failure on `path`.
    Io { path: PathBuf, source: io::Error },
    /// A telemetry log line did not decode. `line` is 1-based.
    Json { line: usize, source: serde_json::Error },
    /// The configuration file did not decode.
    Config { path: PathBuf, source: serde_json::Error },
    /// Battery voltage above the configured ceiling.
    VoltageOutOfRange { millivolts: u32, max: u32 },
    /// A status flag listed as critical is set.
    CriticalFlag(String),
    /// The source was closed or never connected.
    NotConnected,
    /// Launch attempted while the system is disarmed.
    NotArmed,
    /// The source refused the command in its current state.
    CommandRejected(Command),
    /// Playback speed must be finite and positive.
    InvalidSpeed(f64),
}

impl TelemetryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json { line, source } => write!(f, "telemetry log line {line}: {source}"),
            Self::Config { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            Self::VoltageOutOfRange { millivolts, max } => {
                write!(f, "voltage {millivolts} mV exceeds maximum of {max} mV")
            }
            Self::CriticalFlag(flag) => write!(f, "critical status flag '{flag}' is set"),
            Self::NotConnected => f.write_str("telemetry source is not connected"),
            Self::NotArmed => f.write_str("system is not armed"),
            Self::CommandRejected(cmd) => write!(f, "command {cmd} rejected"),
            Self::InvalidSpeed(speed) => write!(f, "playback speed must be positive, got {speed}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } | Self::Config { source, .. } => Some(source),
            _ => None,
        }
    }
}
