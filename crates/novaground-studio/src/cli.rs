use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "\
usage: novaground-studio [--playback <file>] [--speed <x>] [--config <file>]

  --playback <file>  replay a recorded telemetry log instead of simulating
  --speed <x>        playback speed multiplier (default from config, 1.0)
  --config <file>    config file (default ~/.novaground/config.json)
  -h, --help         show this message";

#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub playback: Option<PathBuf>,
    pub speed: Option<f64>,
    pub config: Option<PathBuf>,
    pub help: bool,
}

/// Parses arguments, excluding the program name.
pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut out = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().with_context(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--playback" => out.playback = Some(value("--playback")?.into()),
            "--config" => out.config = Some(value("--config")?.into()),
            "--speed" => {
                let raw = value("--speed")?;
                let speed: f64 = raw.parse().with_context(|| format!("invalid speed '{raw}'"))?;
                if !(speed.is_finite() && speed > 0.0) {
                    bail!("speed must be positive, got {speed}");
                }
                out.speed = Some(speed);
            }
            "-h" | "--help" => out.help = true,
            other => bail!("unknown argument '{other}'"),
        }
    }
    Ok(out)
}
