//! Ground station state: the telemetry feed, operator commands, data logging
//! and the status line. Independent of the GPU so it can be driven headless.

use std::fmt::Write as _;
use std::sync::mpsc::{self, Receiver};

use chrono::{DateTime, Utc};
use novaground_engine::input::Key;
use novaground_telemetry::logger::DataLogger;
use novaground_telemetry::playback::Playback;
use novaground_telemetry::sim::SimulatedBackend;
use novaground_telemetry::{
    Command, ConnectionStatus, MissionControl, MissionPhase, TelemetryData, TelemetrySource,
};

use crate::monitor::TelemetryMonitor;
use crate::pose::{PoseAction, RocketPose};

// ── Feed ────────────────────────────────────────────────────────────────────

/// Where samples come from.
pub enum Feed {
    Simulated {
        control: MissionControl<SimulatedBackend>,
        /// Timestamp of the last snapshot handed out.
        last_seen: Option<DateTime<Utc>>,
    },
    Playback {
        playback: Playback,
        rx: Receiver<TelemetryData>,
    },
}

impl Feed {
    pub fn simulated(control: MissionControl<SimulatedBackend>) -> Self {
        Self::Simulated { control, last_seen: None }
    }

    pub fn playback(playback: Playback) -> Self {
        let (_, rx) = mpsc::channel();
        Self::Playback { playback, rx }
    }

    /// Samples that arrived since the last poll, oldest first.
    ///
    /// The simulation is sampled, so its snapshot counts as new only when
    /// its timestamp moved. Playback hands over every record it sent, even
    /// records sharing a timestamp.
    pub fn poll(&mut self) -> Vec<TelemetryData> {
        match self {
            Self::Simulated { control, last_seen } => {
                match control.source().latest() {
                    Some(data) if *last_seen != Some(data.timestamp) => {
                        *last_seen = Some(data.timestamp);
                        vec![data]
                    }
                    _ => Vec::new(),
                }
            }
            Self::Playback { rx, .. } => rx.try_iter().collect(),
        }
    }

    pub fn connection(&self) -> ConnectionStatus {
        match self {
            Self::Simulated { control, .. } => control.source().status(),
            Self::Playback { playback, .. } if playback.is_playing() => ConnectionStatus::Playback,
            Self::Playback { .. } => ConnectionStatus::Disconnected,
        }
    }

    pub fn close(&mut self) {
        match self {
            Self::Simulated { control, .. } => control.source_mut().close(),
            Self::Playback { playback, .. } => {
                if playback.is_playing() {
                    playback.stop();
                }
            }
        }
    }
}

// ── Operator keys ───────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operator {
    Arm,
    Disarm,
    Launch,
    Abort,
    Calibrate,
    TogglePause,
    RequestTelemetry,
    ToggleLogging,
    TogglePlayback,
    Slower,
    Faster,
}

impl Operator {
    pub fn for_key(key: Key) -> Option<Self> {
        Some(match key {
            Key::Digit1 => Self::Arm,
            Key::Digit2 => Self::Disarm,
            Key::Enter => Self::Launch,
            Key::X => Self::Abort,
            Key::C => Self::Calibrate,
            Key::P => Self::TogglePause,
            Key::T => Self::RequestTelemetry,
            Key::L => Self::ToggleLogging,
            Key::Space => Self::TogglePlayback,
            Key::Digit9 => Self::Slower,
            Key::Digit0 => Self::Faster,
            _ => return None,
        })
    }
}

pub const KEY_HELP: &[(&str, &str)] = &[
    ("W / S", "pitch rocket up / down"),
    ("A / D", "turn rocket left / right"),
    ("Arrows", "move rocket"),
    ("Q / E", "orbit camera"),
    ("- / =", "camera out / in"),
    ("F", "camera follows rocket"),
    ("1 / 2", "arm / disarm"),
    ("Enter", "launch"),
    ("X", "abort"),
    ("C", "calibrate sensors"),
    ("P", "pause / resume"),
    ("T", "request telemetry"),
    ("L", "start / stop data logging"),
    ("Space", "start / stop playback"),
    ("9 / 0", "playback slower / faster"),
    ("Esc", "quit"),
];

// ── Station ─────────────────────────────────────────────────────────────────

pub struct Station {
    feed: Feed,
    monitor: TelemetryMonitor,
    logger: DataLogger,
    pose: RocketPose,
    latest: Option<TelemetryData>,
    paused: bool,
}

impl Station {
    pub fn new(feed: Feed, monitor: TelemetryMonitor, logger: DataLogger) -> Self {
        Self {
            feed,
            monitor,
            logger,
            pose: RocketPose::default(),
            latest: None,
            paused: false,
        }
    }

    pub fn pose(&self) -> &RocketPose {
        &self.pose
    }

    pub fn latest(&self) -> Option<&TelemetryData> {
        self.latest.as_ref()
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn logger(&self) -> &DataLogger {
        &self.logger
    }

    /// Processes every new sample from the feed: each is logged, checked
    /// and, outside `Idle`, drives the rocket pose.
    pub fn update(&mut self) {
        for data in self.feed.poll() {
            self.logger.log(&data);
            self.monitor.observe(&data);
            if data.phase != MissionPhase::Idle {
                self.pose.follow(&data);
            }
            self.latest = Some(data);
        }
    }

    /// Handles a pressed key. Returns whether it was bound.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if let Some(action) = PoseAction::for_key(key) {
            self.pose.apply(action);
            return true;
        }
        match Operator::for_key(key) {
            Some(op) => {
                self.operate(op);
                true
            }
            None => false,
        }
    }

    pub fn operate(&mut self, op: Operator) {
        if op == Operator::ToggleLogging {
            self.toggle_logging();
            return;
        }

        match &mut self.feed {
            Feed::Simulated { control, .. } => {
                let result = match op {
                    Operator::Arm => {
                        control.arm();
                        Ok(())
                    }
                    Operator::Disarm => {
                        control.disarm();
                        Ok(())
                    }
                    Operator::Launch => control.launch(),
                    Operator::Abort => control.abort(),
                    Operator::Calibrate => control.calibrate(),
                    Operator::TogglePause => {
                        let cmd = if self.paused {
                            Command::ResumeMission
                        } else {
                            Command::PauseMission
                        };
                        control.source_mut().send_command(cmd).map(|accepted| {
                            if accepted {
                                self.paused = !self.paused;
                            }
                        })
                    }
                    Operator::RequestTelemetry => {
                        control.source_mut().send_command(Command::RequestTelemetry).map(|_| ())
                    }
                    Operator::TogglePlayback | Operator::Slower | Operator::Faster => {
                        log::warn!("{op:?} is only available during playback");
                        Ok(())
                    }
                    Operator::ToggleLogging => Ok(()),
                };
                if let Err(e) = result {
                    log::error!("{op:?} failed: {e}");
                }
            }
            Feed::Playback { playback, rx, .. } => match op {
                Operator::TogglePlayback if playback.is_playing() => playback.stop(),
                Operator::TogglePlayback => {
                    let (tx, new_rx) = mpsc::channel();
                    if playback.start(tx) {
                        *rx = new_rx;
                    }
                }
                Operator::Slower | Operator::Faster => {
                    let factor = if op == Operator::Faster { 2.0 } else { 0.5 };
                    if let Err(e) = playback.set_speed(playback.speed() * factor) {
                        log::warn!("{e}");
                    }
                }
                _ => log::warn!("{op:?} is not available during playback"),
            },
        }
    }

    fn toggle_logging(&mut self) {
        if self.logger.is_logging() {
            self.logger.stop();
        } else if let Err(e) = self.logger.start() {
            log::error!("failed to start data logging: {e}");
        }
    }

    pub fn status_line(&self) -> String {
        let panel = match &self.feed {
            Feed::Simulated { control, .. } => Some(control.panel_status().to_string()),
            Feed::Playback { playback, .. } => Some(format!("{}x", playback.speed())),
        };
        status_line(
            self.feed.connection(),
            panel.as_deref(),
            self.latest.as_ref(),
            self.monitor.fault(),
            self.logger.is_logging(),
        )
    }

    pub fn shutdown(&mut self) {
        self.feed.close();
        if self.logger.is_logging() {
            self.logger.stop();
        }
    }
}

/// Window title text summarising the station.
pub fn status_line(
    connection: ConnectionStatus,
    panel: Option<&str>,
    data: Option<&TelemetryData>,
    fault: Option<&str>,
    logging: bool,
) -> String {
    let mut s = format!("NovaGround | {connection}");
    if let Some(panel) = panel {
        let _ = write!(s, " | {panel}");
    }
    match data {
        Some(d) => {
            let _ = write!(
                s,
                " | {} | alt {:.1} m (max {:.1}) | v {:.1} m/s | {:.2} V | T+{:.1} s",
                d.phase,
                d.altitude,
                d.max_altitude,
                d.velocity.z,
                d.volts(),
                d.flight_time,
            );
        }
        None => s.push_str(" | no telemetry"),
    }
    if logging {
        s.push_str(" | REC");
    }
    if let Some(fault) = fault {
        let _ = write!(s, " | FAULT: {fault}");
    }
    s
}
