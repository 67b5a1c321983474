//! Mapping from a printer snapshot to the rendered status-bar frame.

use knob_traits::{ImageId, PrinterSnapshot, PrinterState};

/// An image plus caption, ready for `DisplayPanel::render`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub image: ImageId,
    pub caption: String,
}

/// Status-bar frame for the given snapshot. Controller availability
/// wins over the reported job state; anything unrecognized falls back
/// to the compact progress/speed/state line.
pub fn status_bar_view(snap: &PrinterSnapshot, speed_percent: u16) -> StatusView {
    if !snap.controller_connected {
        return StatusView {
            image: ImageId::ClosedMouth,
            caption: "MCU disconnected.".into(),
        };
    }
    if snap.controller_starting_up {
        return StatusView {
            image: ImageId::ClosedMouth,
            caption: "MCU is starting up...".into(),
        };
    }
    match &snap.state {
        PrinterState::Ready => StatusView {
            image: ImageId::Sleepy,
            caption: "Status: Ready".into(),
        },
        PrinterState::Standby => StatusView {
            image: ImageId::Sleepy,
            caption: "Status: Standby".into(),
        },
        PrinterState::Complete => StatusView {
            image: ImageId::Working,
            caption: "Status: Complete".into(),
        },
        PrinterState::McuDisconnected => StatusView {
            image: ImageId::ClosedMouth,
            caption: "MCU disconnected.".into(),
        },
        PrinterState::Startup => StatusView {
            image: ImageId::ClosedMouth,
            caption: "MCU is starting up...".into(),
        },
        state => {
            let progress = snap.progress_percent.unwrap_or(0.0);
            StatusView {
                image: ImageId::ClosedMouth,
                caption: format!("%: {progress:.2}  S: {speed_percent}  T: {state}"),
            }
        }
    }
}
