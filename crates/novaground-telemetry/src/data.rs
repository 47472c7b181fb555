//! Telemetry sample model and validation.

use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::mission::MissionPhase;

// ── Status flags ────────────────────────────────────────────────────────────

/// Boolean health indicators carried by every sample.
///
/// Packed form: bit 0 `system_health`, bit 1 `sensor_status`,
/// bit 2 `motor_failure`, bit 3 `sensor_error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags {
    pub system_health: bool,
    pub sensor_status: bool,
    pub motor_failure: bool,
    pub sensor_error: bool,
}

impl StatusFlags {
    pub const NAMES: [&'static str; 4] =
        ["system_health", "sensor_status", "motor_failure", "sensor_error"];

    /// Healthy system with working sensors and no faults.
    pub const NOMINAL: Self = Self {
        system_health: true,
        sensor_status: true,
        motor_failure: false,
        sensor_error: false,
    };

    pub fn from_bits(bits: u32) -> Self {
        Self {
            system_health: bits & 0b0001 != 0,
            sensor_status: bits & 0b0010 != 0,
            motor_failure: bits & 0b0100 != 0,
            sensor_error: bits & 0b1000 != 0,
        }
    }

    pub fn bits(self) -> u32 {
        (self.system_health as u32)
            | (self.sensor_status as u32) << 1
            | (self.motor_failure as u32) << 2
            | (self.sensor_error as u32) << 3
    }

    /// Looks a flag up by its field name. Unknown names return `None`.
    pub fn get(self, name: &str) -> Option<bool> {
        match name {
            "system_health" => Some(self.system_health),
            "sensor_status" => Some(self.sensor_status),
            "motor_failure" => Some(self.motor_failure),
            "sensor_error" => Some(self.sensor_error),
            _ => None,
        }
    }
}

// ── Limits ──────────────────────────────────────────────────────────────────

/// Acceptance limits applied by [`TelemetryData::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_voltage_mv: u32,
    /// Flag names that reject a sample when set.
    pub critical_flags: Vec<String>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_voltage_mv: 15_000,
            critical_flags: vec!["motor_failure".into(), "sensor_error".into()],
        }
    }
}

// ── Sample ──────────────────────────────────────────────────────────────────

/// One telemetry sample.
///
/// Position in metres, orientation as `(pitch, yaw, roll)` in degrees,
/// velocity in m/s and acceleration in m/s².
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryData {
    pub position: Vec3,
    pub orientation: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    /// Battery voltage in millivolts.
    pub voltage: u32,
    pub status: StatusFlags,
    pub timestamp: DateTime<Utc>,
    pub altitude: f32,
    pub max_altitude: f32,
    /// Seconds since the mission started.
    pub flight_time: f64,
    pub phase: MissionPhase,
}

impl TelemetryData {
    /// Resting state on the pad: standing gravity reading, full battery.
    pub fn on_pad(timestamp: DateTime<Utc>) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::new(0.0, 0.0, 9.81),
            voltage: 12_000,
            status: StatusFlags::NOMINAL,
            timestamp,
            altitude: 0.0,
            max_altitude: 0.0,
            flight_time: 0.0,
            phase: MissionPhase::Idle,
        }
    }

    pub fn pitch(&self) -> f32 {
        self.orientation.x
    }

    pub fn yaw(&self) -> f32 {
        self.orientation.y
    }

    pub fn roll(&self) -> f32 {
        self.orientation.z
    }

    /// Voltage in volts, for display.
    pub fn volts(&self) -> f32 {
        self.voltage as f32 / 1000.0
    }

    /// Checks the sample against `limits`.
    ///
    /// Voltage is checked before flags. Critical flags are checked in the
    /// order `limits` lists them and the first one set is reported.
    pub fn validate(&self, limits: &Limits) -> Result<(), TelemetryError> {
        if self.voltage > limits.max_voltage_mv {
            return Err(TelemetryError::VoltageOutOfRange {
                millivolts: self.voltage,
                max: limits.max_voltage_mv,
            });
        }
        for name in &limits.critical_flags {
            if self.status.get(name) == Some(true) {
                return Err(TelemetryError::CriticalFlag(name.clone()));
            }
        }
        Ok(())
    }
}
