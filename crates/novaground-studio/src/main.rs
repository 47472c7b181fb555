mod app;
mod cli;
mod geometry;
mod monitor;
mod pose;
mod station;

use std::process::ExitCode;

use anyhow::{Context, Result};
use novaground_engine::device::GpuInit;
use novaground_engine::logging::{init_logging, LoggingConfig};
use novaground_engine::window::{Runtime, RuntimeConfig};
use novaground_telemetry::logger::DataLogger;
use novaground_telemetry::playback::Playback;
use novaground_telemetry::sim::{SimulatedBackend, Simulation};
use novaground_telemetry::{MissionControl, StationConfig};

use crate::app::GroundStation;
use crate::monitor::TelemetryMonitor;
use crate::station::{Feed, Operator, Station, KEY_HELP};

fn main() -> ExitCode {
    let args = match cli::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n\n{}", cli::USAGE);
            return ExitCode::FAILURE;
        }
    };
    if args.help {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(StationConfig::default_path);
    let config = StationConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        log_file: Some(config.event_log_path()),
        ..LoggingConfig::default()
    });
    log::info!("starting NovaGround ground control");

    // Startup banner, printed before the window opens.
    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║       NOVAGROUND GROUND CONTROL        ║");
    println!("  ╚════════════════════════════════════════╝");
    for (keys, what) in KEY_HELP {
        println!("    {keys:<8} {what}");
    }
    println!();

    let logger = DataLogger::new(config.telemetry_log_path());
    let monitor = TelemetryMonitor::new(config.limits.clone());

    let mut station = match &args.playback {
        Some(path) => {
            let mut playback = Playback::new();
            playback.load(path)?;
            playback.set_speed(args.speed.unwrap_or(config.playback_speed))?;
            let mut station = Station::new(Feed::playback(playback), monitor, logger);
            station.operate(Operator::TogglePlayback);
            station
        }
        None => {
            let sim = match config.sim_seed {
                Some(seed) => Simulation::seeded(seed),
                None => Simulation::new(),
            };
            let backend = SimulatedBackend::spawn(sim, config.update_interval())
                .context("failed to start simulation thread")?;
            if let Err(e) = logger.start() {
                log::error!("data logging disabled: {e}");
            }
            Station::new(Feed::simulated(MissionControl::new(backend)), monitor, logger)
        }
    };
    station.update();

    Runtime::run(RuntimeConfig::default(), GpuInit::default(), GroundStation::new(station))
}
