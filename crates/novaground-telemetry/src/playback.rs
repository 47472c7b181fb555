//! Replay of a recorded telemetry log.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::data::TelemetryData;
use crate::error::TelemetryError;
use crate::logger::LogRecord;

/// Parses a JSON-lines telemetry log. Blank lines are skipped.
pub fn parse_log(text: &str) -> Result<Vec<TelemetryData>, TelemetryError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<LogRecord>(line)
                .map(TelemetryData::from)
                .map_err(|source| TelemetryError::Json { line: i + 1, source })
        })
        .collect()
}

/// Wall-clock wait between two recorded samples at `speed`×.
///
/// Out-of-order timestamps give no wait. A wait too long to represent
/// saturates at [`Duration::MAX`].
pub fn playback_delay(prev: DateTime<Utc>, next: DateTime<Utc>, speed: f64) -> Duration {
    let gap = (next - prev).to_std().unwrap_or(Duration::ZERO);
    Duration::try_from_secs_f64(gap.as_secs_f64() / speed).unwrap_or(Duration::MAX)
}

fn check_speed(speed: f64) -> Result<(), TelemetryError> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(TelemetryError::InvalidSpeed(speed))
    }
}

/// Plays recorded samples into a channel on a background thread, paced by
/// their timestamps.
pub struct Playback {
    records: Arc<Vec<TelemetryData>>,
    /// `f64` bits so the speed can change mid-playback.
    speed: Arc<AtomicU64>,
    playing: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Playback {
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    pub fn from_records(records: Vec<TelemetryData>) -> Self {
        Self {
            records: Arc::new(records),
            speed: Arc::new(AtomicU64::new(1.0f64.to_bits())),
            playing: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Replaces the loaded records with the contents of `path`. Stops any
    /// playback in progress. Returns the number of records loaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, TelemetryError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TelemetryError::io(path, e))?;
        let records = parse_log(&text)?;
        if self.is_playing() {
            self.stop();
        }
        log::info!("loaded {} telemetry records from {}", records.len(), path.display());
        self.records = Arc::new(records);
        Ok(self.records.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed.load(Ordering::Relaxed))
    }

    /// Sets the playback multiplier; applies from the next record on.
    pub fn set_speed(&self, speed: f64) -> Result<(), TelemetryError> {
        check_speed(speed)?;
        self.speed.store(speed.to_bits(), Ordering::Relaxed);
        log::info!("playback speed set to {speed}x");
        Ok(())
    }

    /// Starts delivering records to `tx`. Returns `false` (and logs) when
    /// already playing or nothing is loaded.
    pub fn start(&mut self, tx: Sender<TelemetryData>) -> bool {
        if self.is_playing() {
            log::warn!("data playback is already in progress");
            return false;
        }
        if self.records.is_empty() {
            log::warn!("no telemetry data loaded for playback");
            return false;
        }
        // Reap a worker that finished on its own.
        self.join_worker();

        self.playing.store(true, Ordering::Release);
        let records = Arc::clone(&self.records);
        let speed = Arc::clone(&self.speed);
        let playing = Arc::clone(&self.playing);

        let spawned = thread::Builder::new()
            .name("novaground-playback".into())
            .spawn(move || play(&records, &speed, &playing, &tx));
        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                log::info!("data playback started");
                true
            }
            Err(e) => {
                self.playing.store(false, Ordering::Release);
                log::error!("failed to start playback thread: {e}");
                false
            }
        }
    }

    /// Stops playback and waits for the thread to finish.
    pub fn stop(&mut self) {
        if !self.playing.swap(false, Ordering::AcqRel) && self.worker.is_none() {
            log::warn!("data playback is not active");
            return;
        }
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
        self.join_worker();
        log::info!("data playback stopped");
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("playback thread panicked");
            }
        }
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.playing.store(false, Ordering::Release);
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
        self.join_worker();
    }
}

/// Clears the playing flag however the worker exits.
struct PlayingGuard<'a>(&'a AtomicBool);

impl Drop for PlayingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn play(
    records: &[TelemetryData],
    speed: &AtomicU64,
    playing: &AtomicBool,
    tx: &Sender<TelemetryData>,
) {
    let _guard = PlayingGuard(playing);
    let mut prev: Option<DateTime<Utc>> = None;
    for record in records {
        if let Some(prev) = prev {
            let speed = f64::from_bits(speed.load(Ordering::Relaxed));
            if !wait(playback_delay(prev, record.timestamp, speed), playing) {
                return;
            }
        }
        if !playing.load(Ordering::Acquire) {
            return;
        }
        if tx.send(record.clone()).is_err() {
            log::warn!("playback receiver dropped");
            break;
        }
        prev = Some(record.timestamp);
    }
    log::info!("data playback completed");
}

/// Sleeps for `d` unless `playing` clears first. Returns whether to continue.
///
/// A deadline past the clock's range waits until playback is stopped.
fn wait(d: Duration, playing: &AtomicBool) -> bool {
    let Some(deadline) = Instant::now().checked_add(d) else {
        while playing.load(Ordering::Acquire) {
            thread::park();
        }
        return false;
    };
    loop {
        if !playing.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::park_timeout(deadline - now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn records(n: usize, step_ms: i64) -> Vec<TelemetryData> {
        let t0 = Utc::now();
        (0..n)
            .map(|i| {
                let mut d = TelemetryData::on_pad(t0 + chrono::Duration::milliseconds(step_ms * i as i64));
                d.altitude = i as f32;
                d
            })
            .collect()
    }

    fn to_jsonl(data: &[TelemetryData]) -> String {
        data.iter()
            .map(|d| serde_json::to_string(&LogRecord::from(d)).unwrap() + "\n")
            .collect()
    }

    #[test]
    fn parse_skips_blank_lines() {
        let text = format!("\n{}\n\n", to_jsonl(&records(3, 100)));
        let parsed = parse_log(&text).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].altitude, 2.0);
    }

    #[test]
    fn parse_reports_line_number() {
        let mut text = to_jsonl(&records(2, 100));
        text.push_str("{not json}\n");
        match parse_log(&text) {
            Err(TelemetryError::Json { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected json error, got {other:?}"),
        }
    }

    #[test]
    fn delay_scales_with_speed() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::milliseconds(1000);
        assert_eq!(playback_delay(t0, t1, 1.0), Duration::from_secs(1));
        assert_eq!(playback_delay(t0, t1, 2.0), Duration::from_millis(500));
        assert_eq!(playback_delay(t1, t0, 1.0), Duration::ZERO);
    }

    #[test]
    fn delay_saturates_at_tiny_speed() {
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(1);
        assert_eq!(playback_delay(t0, t1, 1e-20), Duration::MAX);
        assert_eq!(playback_delay(t0, t1, f64::MIN_POSITIVE), Duration::MAX);
    }

    #[test]
    fn tiny_speed_waits_until_stopped() {
        let mut p = Playback::from_records(records(2, 1000));
        p.set_speed(1e-20).unwrap();
        let (tx, rx) = mpsc::channel();
        assert!(p.start(tx));
        assert_eq!(rx.recv().unwrap().altitude, 0.0);

        thread::sleep(Duration::from_millis(50));
        assert!(p.is_playing());
        assert!(!p.worker.as_ref().unwrap().is_finished());

        let started = Instant::now();
        p.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!p.is_playing());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn dropped_receiver_ends_playback() {
        let mut p = Playback::from_records(records(3, 10));
        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(p.start(tx));
        p.join_worker();
        assert!(!p.is_playing());
    }

    #[test]
    fn speed_must_be_positive() {
        let p = Playback::new();
        assert!(matches!(p.set_speed(0.0), Err(TelemetryError::InvalidSpeed(_))));
        assert!(matches!(p.set_speed(-2.0), Err(TelemetryError::InvalidSpeed(_))));
        assert!(p.set_speed(f64::NAN).is_err());
        assert_eq!(p.speed(), 1.0);
        p.set_speed(4.0).unwrap();
        assert_eq!(p.speed(), 4.0);
    }

    #[test]
    fn start_without_records_is_noop() {
        let mut p = Playback::new();
        let (tx, _rx) = mpsc::channel();
        assert!(!p.start(tx));
        assert!(!p.is_playing());
    }

    #[test]
    fn plays_all_records_in_order() {
        let mut p = Playback::from_records(records(5, 20));
        p.set_speed(10.0).unwrap();
        let (tx, rx) = mpsc::channel();
        assert!(p.start(tx));

        let got: Vec<f32> = rx.iter().map(|d| d.altitude).collect();
        assert_eq!(got, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(!p.is_playing());

        // Restart after completion.
        let (tx, rx) = mpsc::channel();
        assert!(p.start(tx));
        assert_eq!(rx.iter().count(), 5);
    }

    #[test]
    fn playback_is_paced() {
        let mut p = Playback::from_records(records(3, 100));
        p.set_speed(2.0).unwrap();
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();
        assert!(p.start(tx));
        assert_eq!(rx.iter().count(), 3);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn stop_interrupts_long_gap() {
        let mut p = Playback::from_records(records(2, 60_000));
        let (tx, rx) = mpsc::channel();
        assert!(p.start(tx));
        let (tx2, _rx2) = mpsc::channel();
        assert!(!p.start(tx2));

        assert!(rx.recv().is_ok());
        let started = Instant::now();
        p.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!p.is_playing());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir()
            .join(format!("novaground-playback-{}.jsonl", std::process::id()));
        fs::write(&path, to_jsonl(&records(4, 10))).unwrap();

        let mut p = Playback::new();
        assert_eq!(p.load(&path).unwrap(), 4);
        assert_eq!(p.len(), 4);
        let _ = fs::remove_file(&path);

        assert!(matches!(p.load(&path), Err(TelemetryError::Io { .. })));
        assert_eq!(p.len(), 4);
    }
}
