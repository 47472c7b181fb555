//! Built-in flight simulation used when no live vehicle is attached.
//!
//! [`Simulation`] is the pure stepping model: given a time step, a wall-clock
//! stamp and its own rng it advances one sample. [`SimulatedBackend`] drives
//! a simulation on a background thread and exposes it as a
//! [`TelemetrySource`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::TelemetryData;
use crate::error::TelemetryError;
use crate::lock;
use crate::mission::{Command, MissionPhase};
use crate::source::{ConnectionStatus, TelemetrySource};

const GRAVITY: f32 = 9.81;
const DRAG: f32 = 2.0;
const BURN_ACCEL: f32 = 30.0;
const BURN_ACCEL_JITTER: f32 = 2.0;
const BURN_SECONDS: f64 = 3.0;
const LATERAL_JITTER: f32 = 0.1;
const INITIAL_VOLTAGE_MV: f64 = 12_000.0;
const MIN_VOLTAGE_MV: f64 = 10_000.0;
const GLITCH_PROBABILITY: f64 = 0.001;

// ── Model ───────────────────────────────────────────────────────────────────

/// Deterministic flight model: identical seeds and inputs give identical
/// samples.
pub struct Simulation {
    state: TelemetryData,
    /// Kept fractional so the sub-millivolt drain accumulates.
    voltage_mv: f64,
    /// Seconds since `StartMission`, advanced by each step's `dt`.
    mission_clock: f64,
    rng: StdRng,
}

impl Simulation {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: TelemetryData::on_pad(Utc::now()),
            voltage_mv: INITIAL_VOLTAGE_MV,
            mission_clock: 0.0,
            rng,
        }
    }

    pub fn snapshot(&self) -> &TelemetryData {
        &self.state
    }

    /// Advances the model by `dt` seconds and stamps the sample with `now`.
    pub fn step(&mut self, dt: f32, now: DateTime<Utc>) {
        let s = &mut self.state;
        let phase = s.phase;

        match phase {
            MissionPhase::Launching => {
                s.acceleration.z = BURN_ACCEL
                    + self.rng.gen_range(-BURN_ACCEL_JITTER..=BURN_ACCEL_JITTER);
                integrate_vertical(s, dt);

                s.position.x += self.rng.gen_range(-LATERAL_JITTER..=LATERAL_JITTER);
                s.position.y += self.rng.gen_range(-LATERAL_JITTER..=LATERAL_JITTER);
                s.orientation += Vec3::new(
                    self.rng.gen_range(-1.0..=1.0),
                    self.rng.gen_range(-1.0..=1.0),
                    self.rng.gen_range(-0.5..=0.5),
                );
            }
            MissionPhase::Ascending => {
                s.acceleration.z = -GRAVITY;
                integrate_vertical(s, dt);
                s.max_altitude = s.max_altitude.max(s.altitude);
                if s.velocity.z <= 0.0 {
                    s.phase = MissionPhase::Descending;
                    log::info!("apogee at {:.1} m", s.max_altitude);
                }
            }
            MissionPhase::Descending => {
                s.acceleration.z = -GRAVITY + DRAG;
                integrate_vertical(s, dt);
                if s.altitude <= 0.0 {
                    s.altitude = 0.0;
                    s.position.z = 0.0;
                    s.velocity = Vec3::ZERO;
                    s.acceleration = Vec3::ZERO;
                    s.phase = MissionPhase::Landed;
                    log::info!("touchdown after {:.1} s", self.mission_clock);
                }
            }
            MissionPhase::Idle | MissionPhase::Landed => {}
        }

        // The mission clock keeps running after touchdown until the next
        // abort returns the vehicle to Idle.
        if phase != MissionPhase::Idle {
            self.mission_clock += dt as f64;
            s.flight_time = self.mission_clock;
        }
        if phase == MissionPhase::Launching && self.mission_clock > BURN_SECONDS {
            s.phase = MissionPhase::Ascending;
            log::info!("burnout at {:.1} m", s.altitude);
        }

        if phase != MissionPhase::Idle {
            let drain = self.rng.gen_range(0.5..=1.5);
            self.voltage_mv = (self.voltage_mv - drain).max(MIN_VOLTAGE_MV);
            s.voltage = self.voltage_mv.round() as u32;
        }

        s.status.sensor_error = self.rng.gen_bool(GLITCH_PROBABILITY);
        s.timestamp = now;
    }

    /// Applies a command. Returns `false` when the command is refused.
    pub fn apply(&mut self, cmd: Command) -> bool {
        let s = &mut self.state;
        match cmd {
            Command::StartMission => {
                if s.phase != MissionPhase::Idle {
                    return false;
                }
                s.phase = MissionPhase::Launching;
                s.flight_time = 0.0;
                s.max_altitude = 0.0;
                self.mission_clock = 0.0;
            }
            Command::AbortMission => {
                s.phase = MissionPhase::Idle;
                s.velocity = Vec3::ZERO;
                s.acceleration = Vec3::new(0.0, 0.0, GRAVITY);
            }
            Command::CalibrateSensors => s.orientation = Vec3::ZERO,
            Command::RequestTelemetry | Command::PauseMission | Command::ResumeMission => {}
        }
        true
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

fn integrate_vertical(s: &mut TelemetryData, dt: f32) {
    s.velocity.z += s.acceleration.z * dt;
    s.position.z += s.velocity.z * dt;
    s.altitude = s.position.z;
}

// ── Background driver ───────────────────────────────────────────────────────

struct Shared {
    sim: Mutex<Simulation>,
    running: AtomicBool,
}

/// [`TelemetrySource`] backed by a [`Simulation`] stepped on its own thread.
pub struct SimulatedBackend {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl SimulatedBackend {
    /// Starts stepping `sim` every `interval`, using the interval as `dt`.
    pub fn spawn(sim: Simulation, interval: Duration) -> std::io::Result<Self> {
        let shared = Arc::new(Shared { sim: Mutex::new(sim), running: AtomicBool::new(true) });
        let worker_shared = Arc::clone(&shared);
        let dt = interval.as_secs_f32();

        let worker = thread::Builder::new().name("novaground-sim".into()).spawn(move || {
            log::debug!("simulation thread started ({:?} step)", interval);
            while worker_shared.running.load(Ordering::Acquire) {
                lock(&worker_shared.sim).step(dt, Utc::now());
                thread::park_timeout(interval);
            }
            log::debug!("simulation thread stopped");
        })?;

        log::info!("simulation mode active");
        Ok(Self { shared, worker: Some(worker) })
    }
}

impl TelemetrySource for SimulatedBackend {
    fn send_command(&mut self, cmd: Command) -> Result<bool, TelemetryError> {
        if !self.shared.running.load(Ordering::Acquire) {
            return Err(TelemetryError::NotConnected);
        }
        let accepted = lock(&self.shared.sim).apply(cmd);
        if accepted {
            log::info!("command sent: {cmd}");
        } else {
            log::warn!("command refused: {cmd}");
        }
        Ok(accepted)
    }

    fn latest(&self) -> Option<TelemetryData> {
        Some(lock(&self.shared.sim).snapshot().clone())
    }

    fn status(&self) -> ConnectionStatus {
        if self.shared.running.load(Ordering::Acquire) {
            ConnectionStatus::Simulated
        } else {
            ConnectionStatus::Disconnected
        }
    }

    fn close(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            if worker.join().is_err() {
                log::error!("simulation thread panicked");
            }
            log::info!("telemetry connection closed");
        }
    }
}

impl Drop for SimulatedBackend {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    fn run_until(sim: &mut Simulation, phase: MissionPhase, max_steps: usize) -> usize {
        for i in 0..max_steps {
            if sim.snapshot().phase == phase {
                return i;
            }
            sim.step(DT, Utc::now());
        }
        panic!("never reached {phase:?}; stuck in {:?}", sim.snapshot().phase);
    }

    #[test]
    fn initial_state_matches_pad() {
        let sim = Simulation::seeded(1);
        let s = sim.snapshot();
        assert_eq!(s.phase, MissionPhase::Idle);
        assert_eq!(s.voltage, 12_000);
        assert_eq!(s.acceleration, Vec3::new(0.0, 0.0, 9.81));
        assert!(s.status.system_health && s.status.sensor_status);
    }

    #[test]
    fn idle_does_not_move_or_drain() {
        let mut sim = Simulation::seeded(2);
        for _ in 0..100 {
            sim.step(DT, Utc::now());
        }
        let s = sim.snapshot();
        assert_eq!(s.position, Vec3::ZERO);
        assert_eq!(s.voltage, 12_000);
        assert_eq!(s.flight_time, 0.0);
    }

    #[test]
    fn full_flight_profile() {
        let mut sim = Simulation::seeded(42);
        assert!(sim.apply(Command::StartMission));

        let burn = run_until(&mut sim, MissionPhase::Ascending, 1000);
        assert!((30..=32).contains(&burn), "burn lasted {burn} steps");
        let s = sim.snapshot();
        assert!(s.velocity.z > 80.0);
        assert!(s.altitude > 0.0);

        run_until(&mut sim, MissionPhase::Descending, 1000);
        let apogee = sim.snapshot().max_altitude;
        assert!(apogee > 400.0, "apogee {apogee}");
        assert!(sim.snapshot().velocity.z <= 0.0);

        run_until(&mut sim, MissionPhase::Landed, 1000);
        let s = sim.snapshot();
        assert_eq!(s.altitude, 0.0);
        assert_eq!(s.position.z, 0.0);
        assert_eq!(s.velocity, Vec3::ZERO);
        assert_eq!(s.acceleration, Vec3::ZERO);
        assert_eq!(s.max_altitude, apogee);
        assert!(s.voltage < 12_000);

        let landed_time = s.flight_time;
        sim.step(DT, Utc::now());
        let s = sim.snapshot();
        assert_eq!(s.phase, MissionPhase::Landed);
        assert!((s.flight_time - landed_time - DT as f64).abs() < 1e-9);
        assert_eq!(s.altitude, 0.0);

        // Aborting stops the clock.
        assert!(sim.apply(Command::AbortMission));
        let aborted_time = sim.snapshot().flight_time;
        sim.step(DT, Utc::now());
        assert_eq!(sim.snapshot().flight_time, aborted_time);
    }

    #[test]
    fn same_seed_same_flight() {
        let now = Utc::now();
        let mut a = Simulation::seeded(9);
        let mut b = Simulation::seeded(9);
        a.apply(Command::StartMission);
        b.apply(Command::StartMission);
        for _ in 0..50 {
            a.step(DT, now);
            b.step(DT, now);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn launch_acceleration_within_band() {
        let mut sim = Simulation::seeded(3);
        sim.apply(Command::StartMission);
        for _ in 0..20 {
            sim.step(DT, Utc::now());
            let az = sim.snapshot().acceleration.z;
            assert!((28.0..=32.0).contains(&az), "a_z = {az}");
        }
    }

    #[test]
    fn voltage_never_below_floor() {
        let mut sim = Simulation::seeded(4);
        sim.apply(Command::StartMission);
        run_until(&mut sim, MissionPhase::Landed, 1000);
        // Landed keeps draining.
        for _ in 0..3000 {
            sim.step(DT, Utc::now());
        }
        assert_eq!(sim.snapshot().voltage, 10_000);
    }

    #[test]
    fn start_only_from_idle() {
        let mut sim = Simulation::seeded(5);
        assert!(sim.apply(Command::StartMission));
        assert!(!sim.apply(Command::StartMission));
        sim.step(DT, Utc::now());
        assert!(sim.apply(Command::AbortMission));
        assert!(sim.apply(Command::StartMission));
        assert_eq!(sim.snapshot().flight_time, 0.0);
    }

    #[test]
    fn abort_resets_motion() {
        let mut sim = Simulation::seeded(6);
        sim.apply(Command::StartMission);
        for _ in 0..10 {
            sim.step(DT, Utc::now());
        }
        assert!(sim.apply(Command::AbortMission));
        let s = sim.snapshot();
        assert_eq!(s.phase, MissionPhase::Idle);
        assert_eq!(s.velocity, Vec3::ZERO);
        assert_eq!(s.acceleration, Vec3::new(0.0, 0.0, 9.81));
        assert!(s.altitude > 0.0);
    }

    #[test]
    fn calibrate_zeroes_orientation() {
        let mut sim = Simulation::seeded(7);
        sim.apply(Command::StartMission);
        for _ in 0..10 {
            sim.step(DT, Utc::now());
        }
        assert!(sim.apply(Command::CalibrateSensors));
        assert_eq!(sim.snapshot().orientation, Vec3::ZERO);
    }

    #[test]
    fn passive_commands_accepted_without_change() {
        let mut sim = Simulation::seeded(8);
        let before = sim.snapshot().clone();
        for cmd in [Command::RequestTelemetry, Command::PauseMission, Command::ResumeMission] {
            assert!(sim.apply(cmd));
        }
        assert_eq!(sim.snapshot(), &before);
    }

    #[test]
    fn glitches_are_rare() {
        let mut sim = Simulation::seeded(11);
        let mut glitches = 0;
        for _ in 0..10_000 {
            sim.step(DT, Utc::now());
            glitches += sim.snapshot().status.sensor_error as u32;
        }
        assert!(glitches < 50, "{glitches} glitches in 10k steps");
    }

    #[test]
    fn backend_runs_and_closes() {
        let mut backend =
            SimulatedBackend::spawn(Simulation::seeded(12), Duration::from_millis(2)).unwrap();
        assert_eq!(backend.status(), ConnectionStatus::Simulated);
        assert!(backend.send_command(Command::StartMission).unwrap());
        assert!(!backend.send_command(Command::StartMission).unwrap());

        thread::sleep(Duration::from_millis(50));
        let latest = backend.latest().unwrap();
        assert_ne!(latest.phase, MissionPhase::Idle);

        backend.close();
        assert_eq!(backend.status(), ConnectionStatus::Disconnected);
        assert!(matches!(
            backend.send_command(Command::AbortMission),
            Err(TelemetryError::NotConnected)
        ));
        assert!(backend.latest().is_some());
        backend.close();
    }
}
