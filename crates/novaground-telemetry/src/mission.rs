//! Mission phases, commands and the operator-side arm interlock.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::source::TelemetrySource;

// ── Phase ───────────────────────────────────────────────────────────────────

/// Flight phase reported by a telemetry source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
    #[default]
    Idle,
    Launching,
    Ascending,
    Descending,
    Landed,
}

impl MissionPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Launching => "Launching",
            Self::Ascending => "Ascending",
            Self::Descending => "Descending",
            Self::Landed => "Landed",
        }
    }
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Commands ────────────────────────────────────────────────────────────────

/// Mission command with its numeric wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    StartMission,
    AbortMission,
    RequestTelemetry,
    CalibrateSensors,
    PauseMission,
    ResumeMission,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::StartMission,
        Command::AbortMission,
        Command::RequestTelemetry,
        Command::CalibrateSensors,
        Command::PauseMission,
        Command::ResumeMission,
    ];

    pub fn code(self) -> u8 {
        match self {
            Self::StartMission => 1,
            Self::AbortMission => 2,
            Self::RequestTelemetry => 3,
            Self::CalibrateSensors => 4,
            Self::PauseMission => 5,
            Self::ResumeMission => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartMission => "START_MISSION",
            Self::AbortMission => "ABORT_MISSION",
            Self::RequestTelemetry => "REQUEST_TELEMETRY",
            Self::CalibrateSensors => "CALIBRATE_SENSORS",
            Self::PauseMission => "PAUSE_MISSION",
            Self::ResumeMission => "RESUME_MISSION",
        };
        f.write_str(name)
    }
}

// ── Interlock ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArmState {
    #[default]
    Disarmed,
    Armed,
}

/// Operator panel state shown next to the flight phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Disarmed,
    Armed,
    Launching,
    Idle,
    Calibrating,
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disarmed => "Disarmed",
            Self::Armed => "Armed",
            Self::Launching => "Launching",
            Self::Idle => "Idle",
            Self::Calibrating => "Calibrating",
        })
    }
}

/// Wraps a [`TelemetrySource`] with an arm/disarm safety interlock.
///
/// Launching requires the system to be armed; a successful launch consumes
/// the arm. Abort is always allowed and leaves the system disarmed.
pub struct MissionControl<S: TelemetrySource> {
    source: S,
    arm: ArmState,
    panel: PanelStatus,
}

impl<S: TelemetrySource> MissionControl<S> {
    pub fn new(source: S) -> Self {
        Self { source, arm: ArmState::Disarmed, panel: PanelStatus::Disarmed }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn arm_state(&self) -> ArmState {
        self.arm
    }

    pub fn panel_status(&self) -> PanelStatus {
        self.panel
    }

    pub fn arm(&mut self) {
        if self.arm != ArmState::Armed {
            log::info!("system armed");
        }
        self.arm = ArmState::Armed;
        self.panel = PanelStatus::Armed;
    }

    pub fn disarm(&mut self) {
        if self.arm != ArmState::Disarmed {
            log::info!("system disarmed");
        }
        self.arm = ArmState::Disarmed;
        self.panel = PanelStatus::Disarmed;
    }

    pub fn launch(&mut self) -> Result<(), TelemetryError> {
        if self.arm != ArmState::Armed {
            log::warn!("launch refused: system is not armed");
            return Err(TelemetryError::NotArmed);
        }
        if !self.source.send_command(Command::StartMission)? {
            log::warn!("launch refused by telemetry source");
            return Err(TelemetryError::CommandRejected(Command::StartMission));
        }
        log::info!("mission launched");
        self.arm = ArmState::Disarmed;
        self.panel = PanelStatus::Launching;
        Ok(())
    }

    /// Aborts the mission and disarms, even if the source refuses or is gone.
    pub fn abort(&mut self) -> Result<(), TelemetryError> {
        self.arm = ArmState::Disarmed;
        self.panel = PanelStatus::Idle;
        log::warn!("mission abort requested");
        if self.source.send_command(Command::AbortMission)? {
            Ok(())
        } else {
            Err(TelemetryError::CommandRejected(Command::AbortMission))
        }
    }

    pub fn calibrate(&mut self) -> Result<(), TelemetryError> {
        if self.source.send_command(Command::CalibrateSensors)? {
            self.panel = PanelStatus::Calibrating;
            log::info!("sensors calibrated");
            Ok(())
        } else {
            Err(TelemetryError::CommandRejected(Command::CalibrateSensors))
        }
    }

    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TelemetryData;
    use crate::source::ConnectionStatus;

    /// Records commands; refuses `StartMission` when `refuse_start` is set.
    #[derive(Default)]
    struct Recorder {
        sent: Vec<Command>,
        refuse_start: bool,
        closed: bool,
    }

    impl TelemetrySource for Recorder {
        fn send_command(&mut self, cmd: Command) -> Result<bool, TelemetryError> {
            if self.closed {
                return Err(TelemetryError::NotConnected);
            }
            self.sent.push(cmd);
            Ok(!(self.refuse_start && cmd == Command::StartMission))
        }

        fn latest(&self) -> Option<TelemetryData> {
            None
        }

        fn status(&self) -> ConnectionStatus {
            if self.closed { ConnectionStatus::Disconnected } else { ConnectionStatus::Simulated }
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[test]
    fn command_codes_are_one_to_six() {
        let codes: Vec<u8> = Command::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);
        for cmd in Command::ALL {
            assert_eq!(Command::from_code(cmd.code()), Some(cmd));
        }
        assert_eq!(Command::from_code(0), None);
        assert_eq!(Command::from_code(7), None);
    }

    #[test]
    fn launch_requires_arm() {
        let mut mc = MissionControl::new(Recorder::default());
        assert!(matches!(mc.launch(), Err(TelemetryError::NotArmed)));
        assert!(mc.source().sent.is_empty());

        mc.arm();
        assert_eq!(mc.panel_status().to_string(), "Armed");
        mc.launch().unwrap();
        assert_eq!(mc.source().sent, vec![Command::StartMission]);
        assert_eq!(mc.arm_state(), ArmState::Disarmed);
        assert_eq!(mc.panel_status(), PanelStatus::Launching);
    }

    #[test]
    fn disarm_blocks_launch() {
        let mut mc = MissionControl::new(Recorder::default());
        mc.arm();
        mc.disarm();
        assert!(matches!(mc.launch(), Err(TelemetryError::NotArmed)));
    }

    #[test]
    fn refused_launch_keeps_arm() {
        let mut mc = MissionControl::new(Recorder { refuse_start: true, ..Default::default() });
        mc.arm();
        assert!(matches!(
            mc.launch(),
            Err(TelemetryError::CommandRejected(Command::StartMission))
        ));
        assert_eq!(mc.arm_state(), ArmState::Armed);
    }

    #[test]
    fn abort_always_disarms() {
        let mut mc = MissionControl::new(Recorder::default());
        mc.arm();
        mc.abort().unwrap();
        assert_eq!(mc.arm_state(), ArmState::Disarmed);
        assert_eq!(mc.panel_status(), PanelStatus::Idle);

        mc.arm();
        mc.source_mut().close();
        assert!(matches!(mc.abort(), Err(TelemetryError::NotConnected)));
        assert_eq!(mc.arm_state(), ArmState::Disarmed);
    }

    #[test]
    fn calibrate_forwards_command() {
        let mut mc = MissionControl::new(Recorder::default());
        mc.calibrate().unwrap();
        assert_eq!(mc.into_inner().sent, vec![Command::CalibrateSensors]);
    }
}
