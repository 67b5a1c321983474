//! Quadrature decode and bounded print-speed control.
//!
//! One edge of the primary line per physical detent reaches `on_edge`
//! (the edge source already suppresses electrical bounce). A committed
//! turn is rate-limited by the knob timeout: this is a per-direction-change
//! debounce that caps the maximum turn rate, not a per-pulse filter.

use std::time::{Duration, Instant};

pub const SPEED_MIN: u16 = 10;
pub const SPEED_MAX: u16 = 200;
pub const SPEED_STEP: u16 = 5;
pub const SPEED_DEFAULT: u16 = 100;
/// Consecutive left-turn detections required before a decrease commits.
///
/// Right turns commit immediately; left turns need two strikes. The
/// asymmetry is preserved from the original control surface (origin
/// unclear: encoder polarity quirk or deliberate feel).
pub const LEFT_RUN_COMMIT: u8 = 2;

/// Print speed as an integer percentage, clamped to [10, 200].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedSetting(u16);

impl Default for SpeedSetting {
    fn default() -> Self {
        Self(SPEED_DEFAULT)
    }
}

impl SpeedSetting {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn percent(self) -> u16 {
        self.0
    }

    /// One step up, capped. Returns the (possibly unchanged) new value.
    fn raise(&mut self) -> u16 {
        self.0 = (self.0 + SPEED_STEP).min(SPEED_MAX);
        self.0
    }

    /// One step down, floored. Returns the (possibly unchanged) new value.
    fn lower(&mut self) -> u16 {
        self.0 = self.0.saturating_sub(SPEED_STEP).max(SPEED_MIN);
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// Edge arrived inside the knob timeout; no speed effect.
    Suppressed,
    /// Primary line level did not change; nothing to decode.
    NoTransition,
    /// Direction decoded. `committed` carries the new speed percentage
    /// when this turn committed a change (right turns always commit,
    /// even when already clamped; left turns commit on every second).
    Turned { direction: Turn, committed: Option<u16> },
}

#[derive(Debug)]
pub struct EncoderDecoder {
    last_level: bool,
    left_run: u8,
    last_turn_at: Option<Instant>,
    knob_timeout: Duration,
    speed: SpeedSetting,
}

impl EncoderDecoder {
    /// `initial_clk_high` is the primary line level sampled at startup.
    pub fn new(initial_clk_high: bool, knob_timeout: Duration) -> Self {
        Self {
            last_level: initial_clk_high,
            left_run: 0,
            last_turn_at: None,
            knob_timeout,
            speed: SpeedSetting::new(),
        }
    }

    #[inline]
    pub fn speed_percent(&self) -> u16 {
        self.speed.percent()
    }

    /// Decode one qualifying edge of the primary line.
    ///
    /// The caller is responsible for refreshing the activity clock for
    /// every edge, including suppressed ones, before this runs.
    pub fn on_edge(&mut self, clk_high: bool, dt_high: bool, now: Instant) -> EdgeOutcome {
        if let Some(last) = self.last_turn_at {
            if now.saturating_duration_since(last) < self.knob_timeout {
                return EdgeOutcome::Suppressed;
            }
        }

        if clk_high == self.last_level {
            return EdgeOutcome::NoTransition;
        }

        // Secondary line differing from the primary's new level means a
        // right turn; agreeing means a left turn.
        let direction = if dt_high != clk_high {
            Turn::Right
        } else {
            Turn::Left
        };

        let committed = match direction {
            Turn::Right => {
                self.left_run = 0;
                Some(self.speed.raise())
            }
            Turn::Left => {
                self.left_run += 1;
                if self.left_run >= LEFT_RUN_COMMIT {
                    self.left_run = 0;
                    Some(self.speed.lower())
                } else {
                    None
                }
            }
        };

        self.last_level = clk_high;
        self.last_turn_at = Some(now);
        EdgeOutcome::Turned {
            direction,
            committed,
        }
    }
}
