//! Telemetry data logger: one JSON object per line.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::data::{StatusFlags, TelemetryData};
use crate::error::TelemetryError;
use crate::lock;
use crate::mission::MissionPhase;

/// Flattened on-disk form of a [`TelemetryData`] sample.
///
/// The derived fields after `sensor_status` are optional so logs written by
/// tools that only know the basic columns still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub position_x: f32,
    pub position_y: f32,
    pub position_z: f32,
    pub orientation_pitch: f32,
    pub orientation_yaw: f32,
    pub orientation_roll: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub velocity_z: f32,
    pub acceleration_x: f32,
    pub acceleration_y: f32,
    pub acceleration_z: f32,
    pub voltage: u32,
    pub motor_failure: bool,
    pub sensor_error: bool,
    pub system_health: bool,
    pub sensor_status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_altitude: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<MissionPhase>,
}

impl From<&TelemetryData> for LogRecord {
    fn from(d: &TelemetryData) -> Self {
        Self {
            timestamp: d.timestamp,
            position_x: d.position.x,
            position_y: d.position.y,
            position_z: d.position.z,
            orientation_pitch: d.orientation.x,
            orientation_yaw: d.orientation.y,
            orientation_roll: d.orientation.z,
            velocity_x: d.velocity.x,
            velocity_y: d.velocity.y,
            velocity_z: d.velocity.z,
            acceleration_x: d.acceleration.x,
            acceleration_y: d.acceleration.y,
            acceleration_z: d.acceleration.z,
            voltage: d.voltage,
            motor_failure: d.status.motor_failure,
            sensor_error: d.status.sensor_error,
            system_health: d.status.system_health,
            sensor_status: d.status.sensor_status,
            altitude: Some(d.altitude),
            max_altitude: Some(d.max_altitude),
            flight_time: Some(d.flight_time),
            phase: Some(d.phase),
        }
    }
}

impl From<LogRecord> for TelemetryData {
    /// Missing derived fields fall back to: altitude = `position_z`,
    /// max altitude = altitude, zero flight time, `Idle`.
    fn from(r: LogRecord) -> Self {
        let altitude = r.altitude.unwrap_or(r.position_z);
        Self {
            position: Vec3::new(r.position_x, r.position_y, r.position_z),
            orientation: Vec3::new(r.orientation_pitch, r.orientation_yaw, r.orientation_roll),
            velocity: Vec3::new(r.velocity_x, r.velocity_y, r.velocity_z),
            acceleration: Vec3::new(r.acceleration_x, r.acceleration_y, r.acceleration_z),
            voltage: r.voltage,
            status: StatusFlags {
                system_health: r.system_health,
                sensor_status: r.sensor_status,
                motor_failure: r.motor_failure,
                sensor_error: r.sensor_error,
            },
            timestamp: r.timestamp,
            altitude,
            max_altitude: r.max_altitude.unwrap_or(altitude),
            flight_time: r.flight_time.unwrap_or(0.0),
            phase: r.phase.unwrap_or_default(),
        }
    }
}

/// Appends telemetry samples to a JSON-lines file.
///
/// Safe to share between threads. A failed write stops logging; call
/// [`start`](Self::start) again to reopen.
pub struct DataLogger {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl DataLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), writer: Mutex::new(None) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_logging(&self) -> bool {
        lock(&self.writer).is_some()
    }

    /// Creates (truncating) the log file. Already logging is a warning, not
    /// an error.
    pub fn start(&self) -> Result<(), TelemetryError> {
        let mut writer = lock(&self.writer);
        if writer.is_some() {
            log::warn!("data logging is already in progress");
            return Ok(());
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| TelemetryError::io(dir, e))?;
        }
        let file = File::create(&self.path).map_err(|e| TelemetryError::io(&self.path, e))?;
        *writer = Some(BufWriter::new(file));
        log::info!("started logging telemetry data to {}", self.path.display());
        Ok(())
    }

    pub fn stop(&self) {
        let mut writer = lock(&self.writer);
        match writer.take() {
            None => log::warn!("data logging is not active"),
            Some(mut w) => {
                if let Err(e) = w.flush() {
                    log::error!("failed to flush telemetry log: {e}");
                }
                log::info!("stopped telemetry data logging");
            }
        }
    }

    /// Writes one sample. Does nothing while logging is stopped.
    pub fn log(&self, data: &TelemetryData) {
        let mut writer = lock(&self.writer);
        let Some(w) = writer.as_mut() else {
            return;
        };
        if let Err(e) = write_record(w, &LogRecord::from(data)) {
            log::error!("failed to log telemetry data: {e}");
            *writer = None;
            log::info!("stopped telemetry data logging");
        }
    }
}

fn write_record(w: &mut BufWriter<File>, record: &LogRecord) -> io::Result<()> {
    serde_json::to_writer(&mut *w, record)?;
    w.write_all(b"\n")?;
    w.flush()
}

impl Drop for DataLogger {
    fn drop(&mut self) {
        if let Some(w) = lock(&self.writer).as_mut() {
            if let Err(e) = w.flush() {
                log::error!("failed to flush telemetry log on shutdown: {e}");
            }
        }
    }
}
