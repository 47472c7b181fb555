//! Watches the telemetry stream and reports changes worth an operator's
//! attention, once per change rather than once per sample.

use novaground_telemetry::{Limits, MissionPhase, TelemetryData, TelemetryError};

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    PhaseChanged { from: MissionPhase, to: MissionPhase },
    /// Sample failed validation; carries the rendered error.
    Fault(String),
    FaultCleared,
}

pub struct TelemetryMonitor {
    limits: Limits,
    phase: Option<MissionPhase>,
    fault: Option<String>,
}

impl TelemetryMonitor {
    pub fn new(limits: Limits) -> Self {
        Self { limits, phase: None, fault: None }
    }

    /// Current fault text, if the last sample was rejected.
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Feeds one sample and returns the alerts it raised, logging each.
    pub fn observe(&mut self, data: &TelemetryData) -> Vec<Alert> {
        let mut alerts = Vec::new();

        match self.phase.replace(data.phase) {
            Some(from) if from != data.phase => {
                alerts.push(Alert::PhaseChanged { from, to: data.phase });
            }
            _ => {}
        }

        let fault = data.validate(&self.limits).err().map(|e: TelemetryError| e.to_string());
        if fault != self.fault {
            match &fault {
                Some(msg) => alerts.push(Alert::Fault(msg.clone())),
                None => alerts.push(Alert::FaultCleared),
            }
            self.fault = fault;
        }

        for alert in &alerts {
            match alert {
                Alert::PhaseChanged { from, to } => log::info!("flight phase: {from} -> {to}"),
                Alert::Fault(msg) => log::warn!("invalid telemetry: {msg}"),
                Alert::FaultCleared => log::info!("telemetry back within limits"),
            }
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn first_sample_sets_baseline() {
        let mut m = TelemetryMonitor::new(Limits::default());
        assert!(m.observe(&TelemetryData::on_pad(Utc::now())).is_empty());
    }

    #[test]
    fn phase_change_reported_once() {
        let mut m = TelemetryMonitor::new(Limits::default());
        let mut data = TelemetryData::on_pad(Utc::now());
        m.observe(&data);

        data.phase = MissionPhase::Launching;
        assert_eq!(
            m.observe(&data),
            vec![Alert::PhaseChanged { from: MissionPhase::Idle, to: MissionPhase::Launching }]
        );
        assert!(m.observe(&data).is_empty());
    }

    #[test]
    fn fault_raised_and_cleared() {
        let mut m = TelemetryMonitor::new(Limits::default());
        let mut data = TelemetryData::on_pad(Utc::now());
        m.observe(&data);

        data.status.sensor_error = true;
        let alerts = m.observe(&data);
        assert!(matches!(alerts.as_slice(), [Alert::Fault(msg)] if msg.contains("sensor_error")));
        assert!(m.fault().is_some());
        assert!(m.observe(&data).is_empty());

        data.status.sensor_error = false;
        assert_eq!(m.observe(&data), vec![Alert::FaultCleared]);
        assert!(m.fault().is_none());
    }
}
