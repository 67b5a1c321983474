//! Test and helper mocks for knob_core.

use crate::error::KnobError;
use knob_traits::{
    Clock, DisplayPanel, ImageId, PrinterCommands, PrinterSnapshot, PrinterStatus, Speech,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentCommand {
    SetSpeed(u16),
    Pause,
    Resume,
    RestartFirmware,
    HomeAll,
    ClearStats,
}

/// Records every printer command; optionally refuses them all.
#[derive(Clone, Default)]
pub struct RecordingCommands {
    sent: Arc<Mutex<Vec<SentCommand>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    pub fn sent(&self) -> Vec<SentCommand> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }

    fn record(&self, cmd: SentCommand) -> Result<(), BoxError> {
        if let Ok(mut g) = self.sent.lock() {
            g.push(cmd);
        }
        if self.fail.load(Ordering::Relaxed) {
            Err(Box::new(KnobError::CommandRefused(format!("{cmd:?}"))))
        } else {
            Ok(())
        }
    }
}

impl PrinterCommands for RecordingCommands {
    fn set_speed(&mut self, percent: u16) -> Result<(), BoxError> {
        self.record(SentCommand::SetSpeed(percent))
    }
    fn pause(&mut self) -> Result<(), BoxError> {
        self.record(SentCommand::Pause)
    }
    fn resume(&mut self) -> Result<(), BoxError> {
        self.record(SentCommand::Resume)
    }
    fn restart_firmware(&mut self) -> Result<(), BoxError> {
        self.record(SentCommand::RestartFirmware)
    }
    fn home_all(&mut self) -> Result<(), BoxError> {
        self.record(SentCommand::HomeAll)
    }
    fn clear_stats(&mut self) -> Result<(), BoxError> {
        self.record(SentCommand::ClearStats)
    }
}

/// Records spoken phrases in order.
#[derive(Clone, Default)]
pub struct RecordingSpeech {
    phrases: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phrases(&self) -> Vec<String> {
        self.phrases.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl Speech for RecordingSpeech {
    fn speak(&mut self, text: &str) -> Result<(), BoxError> {
        if let Ok(mut g) = self.phrases.lock() {
            g.push(text.to_string());
        }
        Ok(())
    }
}

/// Records rendered frames in order.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    frames: Arc<Mutex<Vec<(ImageId, String)>>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<(ImageId, String)> {
        self.frames.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl DisplayPanel for RecordingDisplay {
    fn render(&mut self, image: ImageId, caption: &str) -> Result<(), BoxError> {
        if let Ok(mut g) = self.frames.lock() {
            g.push((image, caption.to_string()));
        }
        Ok(())
    }
}

/// Status client that replays a scripted response sequence; once the
/// script runs out, the final entry repeats forever. An optional fetch
/// delay simulates a slow printer API.
#[derive(Clone)]
pub struct ScriptedStatus {
    script: Arc<Mutex<Vec<Result<PrinterSnapshot, String>>>>,
    cursor: Arc<AtomicUsize>,
    fetches: Arc<AtomicUsize>,
    fetch_delay: Duration,
}

impl ScriptedStatus {
    pub fn always(snapshot: PrinterSnapshot) -> Self {
        Self::sequence(vec![Ok(snapshot)])
    }

    pub fn always_failing(message: &str) -> Self {
        Self::sequence(vec![Err(message.to_string())])
    }

    pub fn sequence(script: Vec<Result<PrinterSnapshot, String>>) -> Self {
        assert!(!script.is_empty(), "script must have at least one entry");
        Self {
            script: Arc::new(Mutex::new(script)),
            cursor: Arc::new(AtomicUsize::new(0)),
            fetches: Arc::new(AtomicUsize::new(0)),
            fetch_delay: Duration::ZERO,
        }
    }

    /// Make every fetch block for `delay` before answering.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl PrinterStatus for ScriptedStatus {
    fn fetch_snapshot(&mut self) -> Result<PrinterSnapshot, BoxError> {
        if !self.fetch_delay.is_zero() {
            std::thread::sleep(self.fetch_delay);
        }
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        let guard = self
            .script
            .lock()
            .map_err(|_| Box::new(KnobError::Network("script poisoned".into())) as BoxError)?;
        let entry = guard[idx.min(guard.len() - 1)].clone();
        entry.map_err(|msg| Box::new(KnobError::Network(msg)) as BoxError)
    }
}

/// Deterministic clock whose time advances only via `sleep` or `advance`.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.origin + off
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}
