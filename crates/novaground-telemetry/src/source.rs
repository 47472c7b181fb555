use std::fmt;

use crate::data::TelemetryData;
use crate::error::TelemetryError;
use crate::mission::Command;

/// Link state of a telemetry source, shown in the station's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Connected to the built-in flight simulation.
    Simulated,
    /// Replaying a recorded log.
    Playback,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => f.write_str("Connected: Simulation | Telemetry: Simulated"),
            Self::Playback => f.write_str("Connected: Playback | Telemetry: Recorded"),
            Self::Disconnected => f.write_str("Disconnected | No Telemetry"),
        }
    }
}

/// Something that produces telemetry and accepts mission commands.
///
/// Implementations are polled from the UI thread; producing samples happens
/// wherever the implementation likes.
pub trait TelemetrySource {
    /// Sends `cmd`. `Ok(false)` means the source understood the command but
    /// refused it in its current state.
    fn send_command(&mut self, cmd: Command) -> Result<bool, TelemetryError>;

    /// Most recent sample, if any has been produced yet.
    fn latest(&self) -> Option<TelemetryData>;

    fn status(&self) -> ConnectionStatus;

    /// Stops producing samples. Further commands fail with `NotConnected`.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text() {
        assert!(ConnectionStatus::Simulated.to_string().starts_with("Connected"));
        assert!(ConnectionStatus::Playback.is_connected());
        assert!(!ConnectionStatus::Disconnected.is_connected());
        assert_eq!(ConnectionStatus::Disconnected.to_string(), "Disconnected | No Telemetry");
    }
}
