use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "novaground_telemetry=debug,wgpu=warn").
///
/// `log_file`, when set, receives a copy of every record in addition to stderr.
/// Parent directories are created on demand.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            log_file: None,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter.as_deref() {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        // wgpu is chatty at info level.
        builder.filter_module("wgpu_core", log::LevelFilter::Warn);
        builder.filter_module("wgpu_hal", log::LevelFilter::Warn);

        let mut file_error = None;
        match config.log_file.as_ref().map(open_log_file) {
            Some(Ok(file)) => {
                // ANSI escapes would end up in the file.
                builder.write_style(env_logger::WriteStyle::Never);
                builder.target(env_logger::Target::Pipe(Box::new(Tee { file })));
            }
            Some(Err(e)) => {
                builder.write_style(config.write_style);
                file_error = Some(e);
            }
            None => {
                builder.write_style(config.write_style);
            }
        }

        builder.init();

        if let (Some(path), Some(e)) = (config.log_file.as_ref(), file_error) {
            log::warn!("could not open log file {}: {e}; logging to stderr only", path.display());
        }
        log::debug!("logging initialized");
    });
}

fn open_log_file(path: &PathBuf) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Duplicates formatted records to stderr and a file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}
