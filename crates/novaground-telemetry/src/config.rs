//! Ground station settings, read from `~/.novaground/config.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::Limits;
use crate::error::TelemetryError;

pub const APP_DIR: &str = ".novaground";
pub const CONFIG_FILE: &str = "config.json";

/// Station configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Simulation step and UI poll interval.
    pub update_interval_ms: u64,
    /// Overrides `~/.novaground/logs`.
    pub log_dir: Option<PathBuf>,
    pub telemetry_log_file: String,
    pub event_log_file: String,
    /// `env_logger` filter string, e.g. `"info,novaground_telemetry=debug"`.
    pub log_filter: Option<String>,
    pub limits: Limits,
    pub playback_speed: f64,
    /// Fixed simulator seed for reproducible runs.
    pub sim_seed: Option<u64>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 100,
            log_dir: None,
            telemetry_log_file: "telemetry.jsonl".into(),
            event_log_file: "events.log".into(),
            log_filter: None,
            limits: Limits::default(),
            playback_speed: 1.0,
            sim_seed: None,
        }
    }
}

impl StationConfig {
    /// `~/.novaground`, or `./.novaground` without a home directory.
    pub fn app_dir() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
    }

    pub fn default_path() -> PathBuf {
        Self::app_dir().join(CONFIG_FILE)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TelemetryError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|source| TelemetryError::Config { path: path.to_path_buf(), source })
    }

    /// Loads `path` if it exists, defaults otherwise. A file that exists but
    /// does not parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| Self::app_dir().join("logs"))
    }

    pub fn telemetry_log_path(&self) -> PathBuf {
        self.log_dir().join(&self.telemetry_log_file)
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.log_dir().join(&self.event_log_file)
    }

    /// Update interval, never shorter than 1 ms.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("novaground-config-{}-{name}.json", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults() {
        let c = StationConfig::default();
        assert_eq!(c.update_interval(), Duration::from_millis(100));
        assert_eq!(c.playback_speed, 1.0);
        assert_eq!(c.limits.max_voltage_mv, 15_000);
        assert!(c.telemetry_log_path().ends_with("logs/telemetry.jsonl"));
        assert!(c.event_log_path().ends_with("logs/events.log"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let path = temp_file(
            "partial",
            r#"{ "update_interval_ms": 50, "log_dir": "/tmp/ng", "limits": { "max_voltage_mv": 13000 } }"#,
        );
        let c = StationConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(c.update_interval_ms, 50);
        assert_eq!(c.limits.max_voltage_mv, 13_000);
        assert_eq!(c.limits.critical_flags, Limits::default().critical_flags);
        assert_eq!(c.telemetry_log_path(), PathBuf::from("/tmp/ng/telemetry.jsonl"));
        assert_eq!(c.sim_seed, None);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let c = StationConfig { update_interval_ms: 0, ..Default::default() };
        assert_eq!(c.update_interval(), Duration::from_millis(1));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("novaground-config-does-not-exist.json");
        assert_eq!(StationConfig::load_or_default(&path).unwrap(), StationConfig::default());
        assert!(matches!(StationConfig::load(&path), Err(TelemetryError::Io { .. })));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_file("bad", "{ update_interval_ms: }");
        let result = StationConfig::load_or_default(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(TelemetryError::Config { .. })));
    }
}
