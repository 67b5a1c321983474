pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::fmt;

/// Fixed set of face images the front panel can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageId {
    OpenMouth,
    ClosedMouth,
    Sleepy,
    Working,
}

/// Print job state as reported by the controller API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterState {
    Printing,
    Paused,
    Ready,
    Standby,
    Complete,
    Startup,
    McuDisconnected,
    /// Any state string the API reports that we do not model explicitly.
    Other(String),
}

impl fmt::Display for PrinterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Printing => write!(f, "printing"),
            Self::Paused => write!(f, "paused"),
            Self::Ready => write!(f, "ready"),
            Self::Standby => write!(f, "standby"),
            Self::Complete => write!(f, "complete"),
            Self::Startup => write!(f, "startup"),
            Self::McuDisconnected => write!(f, "MCU disconnected"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Point-in-time view of the printer, fetched fresh on every query.
#[derive(Debug, Clone, PartialEq)]
pub struct PrinterSnapshot {
    pub state: PrinterState,
    /// Print progress in percent, absent when no job is active.
    pub progress_percent: Option<f32>,
    pub controller_connected: bool,
    pub controller_starting_up: bool,
}

impl PrinterSnapshot {
    /// Snapshot for a fully-up controller in the given state.
    pub fn with_state(state: PrinterState) -> Self {
        Self {
            state,
            progress_percent: None,
            controller_connected: true,
            controller_starting_up: false,
        }
    }
}

pub trait DisplayPanel {
    fn render(
        &mut self,
        image: ImageId,
        caption: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Speech output. `speak` blocks until audible playback completes.
pub trait Speech {
    fn speak(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait PrinterStatus {
    fn fetch_snapshot(
        &mut self,
    ) -> Result<PrinterSnapshot, Box<dyn std::error::Error + Send + Sync>>;
}

/// Best-effort printer actions. Each call is a single request with no retry.
pub trait PrinterCommands {
    fn set_speed(&mut self, percent: u16)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn pause(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn resume(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn restart_firmware(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn home_all(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn clear_stats(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
