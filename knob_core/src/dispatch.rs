//! Intent dispatch: the slow "act" phase.
//!
//! Every method here may block on a network round-trip or on speech
//! playback, and touches none of the coordinator's decode state. All
//! printer actions are single best-effort requests: a failure is spoken
//! or logged and never retried.

use crate::status::status_bar_view;
use knob_traits::{
    Clock, DisplayPanel, ImageId, MonotonicClock, PrinterCommands, PrinterSnapshot, PrinterState,
    PrinterStatus, Speech,
};
use std::time::Duration;

pub struct Dispatcher<D, S, P, C, K = MonotonicClock> {
    display: D,
    speech: S,
    status: P,
    commands: C,
    clock: K,
    /// Pause between firmware restart and homing in the confirm action.
    settle: Duration,
}

impl<D, S, P, C> Dispatcher<D, S, P, C, MonotonicClock>
where
    D: DisplayPanel,
    S: Speech,
    P: PrinterStatus,
    C: PrinterCommands,
{
    pub fn new(display: D, speech: S, status: P, commands: C, settle: Duration) -> Self {
        Self::with_clock(display, speech, status, commands, settle, MonotonicClock::new())
    }
}

impl<D, S, P, C, K> Dispatcher<D, S, P, C, K>
where
    D: DisplayPanel,
    S: Speech,
    P: PrinterStatus,
    C: PrinterCommands,
    K: Clock,
{
    pub fn with_clock(display: D, speech: S, status: P, commands: C, settle: Duration, clock: K) -> Self {
        Self {
            display,
            speech,
            status,
            commands,
            clock,
            settle,
        }
    }

    /// Speak, logging a playback failure instead of surfacing it.
    fn say(&mut self, text: &str) {
        if let Err(e) = self.speech.speak(text) {
            tracing::warn!(error = %e, text, "speech output failed");
        }
    }

    fn show(&mut self, image: ImageId, caption: &str) {
        if let Err(e) = self.display.render(image, caption) {
            tracing::warn!(error = %e, caption, "display render failed");
        }
    }

    /// Apply a committed speed change and confirm it audibly.
    pub fn announce_speed(&mut self, percent: u16) {
        match self.commands.set_speed(percent) {
            Ok(()) => {
                tracing::info!(percent, "print speed set");
                self.say(&format!("Print speed set to {percent} percent."));
            }
            Err(e) => {
                tracing::warn!(error = %e, percent, "speed change failed");
                self.say("Failed to change print speed.");
            }
        }
    }

    /// Deferred single-click status report. A failed fetch is a silent
    /// skip: the user hears nothing and no command is issued.
    pub fn single_click_report(&mut self) {
        let snap = match self.status.fetch_snapshot() {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "status fetch failed; skipping click report");
                return;
            }
        };
        if !snap.controller_connected {
            self.say("MCU disconnected. Restarting firmware.");
            self.restart_firmware_with_feedback();
            return;
        }
        if snap.controller_starting_up {
            self.say("MCU is starting up. Please wait.");
            self.show(ImageId::ClosedMouth, "MCU is starting up...");
            return;
        }
        match snap.state {
            PrinterState::Printing => {
                // Two decimals, matching the client's progress rounding.
                let p = snap.progress_percent.unwrap_or(0.0);
                self.say(&format!("Print progress is {p:.2} percent."));
            }
            PrinterState::Ready => {
                self.say("Status: Ready");
                self.show(ImageId::Sleepy, "Status: Ready");
            }
            PrinterState::Standby => {
                self.say("Status: Standby");
                self.show(ImageId::Sleepy, "Status: Standby");
            }
            PrinterState::Complete => {
                self.say("Status: Complete");
                self.show(ImageId::Working, "Status: Complete");
            }
            state => self.say(&format!("The printer status is {state}.")),
        }
    }

    /// Double-click intent. Returns true when the complete-state confirm
    /// sequence ran (the caller releases the status bar afterwards).
    pub fn double_click(&mut self) -> bool {
        let complete = match self.status.fetch_snapshot() {
            Ok(s) => s.state == PrinterState::Complete,
            Err(e) => {
                tracing::warn!(error = %e, "status fetch failed; treating as not complete");
                false
            }
        };
        if complete {
            self.confirm_complete();
            true
        } else {
            self.pause_or_resume();
            false
        }
    }

    /// Pause/resume toggle based on the current print state.
    pub fn pause_or_resume(&mut self) {
        let snap = match self.status.fetch_snapshot() {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "status fetch failed; pause/resume skipped");
                return;
            }
        };
        match snap.state {
            PrinterState::Printing => match self.commands.pause() {
                Ok(()) => {
                    tracing::info!("print paused");
                    self.say("Print paused.");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "pause failed");
                    self.say("Failed to pause print.");
                }
            },
            PrinterState::Paused => match self.commands.resume() {
                Ok(()) => {
                    tracing::info!("print resumed");
                    self.say("Print resumed.");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "resume failed");
                    self.say("Failed to resume print.");
                }
            },
            PrinterState::Ready => {
                let p = snap.progress_percent.unwrap_or(0.0);
                self.say(&format!(
                    "Printer is in ready state. Print progress is {p:.2} percent."
                ));
            }
            state => self.say(&format!("Printer is in {state} state.")),
        }
    }

    /// Complete-state confirm sequence: restart firmware, settle, home
    /// all axes, clear print stats. Each step is best-effort; later
    /// steps run regardless of earlier failures.
    pub fn confirm_complete(&mut self) {
        self.restart_firmware_with_feedback();
        self.show(ImageId::Working, "Restarting firmware...");
        // Blocking by design: presses during the settle window queue up
        // behind this dispatch and are handled afterwards.
        self.clock.sleep(self.settle);
        match self.commands.home_all() {
            Ok(()) => {
                tracing::info!("homing all axes");
                self.say("Homing all axes.");
            }
            Err(e) => {
                tracing::warn!(error = %e, "home all failed");
                self.say("Failed to home all axes.");
            }
        }
        match self.commands.clear_stats() {
            Ok(()) => {
                tracing::info!("print stats cleared");
                self.say("Print stats cleared.");
            }
            Err(e) => {
                tracing::warn!(error = %e, "clear stats failed");
                self.say("Failed to clear print stats.");
            }
        }
        self.show(ImageId::Working, "Homing all axes");
    }

    /// Repaint the status bar from a fresh snapshot. Returns false when
    /// the fetch failed and no frame was drawn; the idle chain retries
    /// naturally on its next tick.
    pub fn render_status_bar(&mut self, speed_percent: u16) -> bool {
        let snap: PrinterSnapshot = match self.status.fetch_snapshot() {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "status fetch failed; status bar repaint skipped");
                return false;
            }
        };
        let view = status_bar_view(&snap, speed_percent);
        self.show(view.image, &view.caption);
        true
    }

    fn restart_firmware_with_feedback(&mut self) {
        match self.commands.restart_firmware() {
            Ok(()) => {
                tracing::info!("firmware restart issued");
                self.say("Firmware restarted.");
            }
            Err(e) => {
                tracing::warn!(error = %e, "firmware restart failed");
                self.say("Failed to restart firmware.");
            }
        }
    }
}
