//! Single vs. double click disambiguation.
//!
//! A first press schedules a deferred confirmation check one
//! double-click window later; a second press inside the window cancels
//! it and fires the double-click intent instead. Cancellation is a
//! generation counter: every press bumps the live generation, and a
//! firing deadline must present the generation it was scheduled with.
//! A deadline that lost the race (its generation is stale, or a second
//! press already confirmed the pair) aborts without side effects.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickPhase {
    Idle,
    /// A first press is waiting out the double-click window.
    PendingConfirmation,
    /// A second press arrived in time; the pair is spoken for.
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// First press of a potential pair; schedule a deferred check that
    /// presents `generation` when it fires.
    Scheduled { generation: u64 },
    /// Second press inside the window; act now, the deferred check for
    /// the first press is void.
    DoubleClick,
}

#[derive(Debug)]
pub struct ClickDisambiguator {
    phase: ClickPhase,
    last_press_at: Option<Instant>,
    generation: u64,
    window: Duration,
}

impl ClickDisambiguator {
    pub fn new(window: Duration) -> Self {
        Self {
            phase: ClickPhase::Idle,
            last_press_at: None,
            generation: 0,
            window,
        }
    }

    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    #[inline]
    pub fn phase(&self) -> ClickPhase {
        self.phase
    }

    /// Record one debounced button press.
    pub fn on_press(&mut self, now: Instant) -> PressOutcome {
        if let Some(last) = self.last_press_at {
            if now.saturating_duration_since(last) < self.window {
                // Second click of a pair. Invalidate the pending deferred
                // check; `last_press_at` intentionally stays on the first
                // click so a rapid third press starts a fresh sequence.
                self.generation = self.generation.wrapping_add(1);
                self.phase = ClickPhase::Confirmed;
                return PressOutcome::DoubleClick;
            }
        }
        self.last_press_at = Some(now);
        self.generation = self.generation.wrapping_add(1);
        self.phase = ClickPhase::PendingConfirmation;
        PressOutcome::Scheduled {
            generation: self.generation,
        }
    }

    /// Deferred confirmation check. Returns true when the single click
    /// stands and its status action should run; false when a second
    /// press superseded this deadline.
    pub fn confirm_deadline(&mut self, generation: u64) -> bool {
        if generation == self.generation && self.phase == ClickPhase::PendingConfirmation {
            self.phase = ClickPhase::Idle;
            return true;
        }
        false
    }
}
