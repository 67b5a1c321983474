//! Desktop stand-ins for the panel peripherals.
//!
//! `ConsoleDisplay` and `ConsoleSpeech` print to stdout, and
//! `SimulatedKnob` produces the same level pairs a real encoder would,
//! so the whole interaction loop can be driven from a keyboard.

use knob_traits::{DisplayPanel, ImageId, Speech};

#[derive(Debug, Default)]
pub struct ConsoleDisplay;

impl DisplayPanel for ConsoleDisplay {
    fn render(
        &mut self,
        image: ImageId,
        caption: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("[display {image:?}] {caption}");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConsoleSpeech;

impl Speech for ConsoleSpeech {
    fn speak(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("[speech] {text}");
        Ok(())
    }
}

/// Generates quadrature level pairs for scripted turns.
///
/// A detent toggles CLK; DT equals the new CLK level for a left turn
/// and differs from it for a right turn.
#[derive(Debug)]
pub struct SimulatedKnob {
    clk_high: bool,
}

impl SimulatedKnob {
    pub fn new(initial_clk_high: bool) -> Self {
        Self {
            clk_high: initial_clk_high,
        }
    }

    /// Returns the `(clk, dt)` levels after one clockwise detent.
    pub fn turn_right(&mut self) -> (bool, bool) {
        self.clk_high = !self.clk_high;
        (self.clk_high, !self.clk_high)
    }

    /// Returns the `(clk, dt)` levels after one counter-clockwise detent.
    pub fn turn_left(&mut self) -> (bool, bool) {
        self.clk_high = !self.clk_high;
        (self.clk_high, self.clk_high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_turns_keep_dt_opposite_to_clk() {
        let mut knob = SimulatedKnob::new(true);
        assert_eq!(knob.turn_right(), (false, true));
        assert_eq!(knob.turn_right(), (true, false));
    }

    #[test]
    fn left_turns_keep_dt_equal_to_clk() {
        let mut knob = SimulatedKnob::new(true);
        assert_eq!(knob.turn_left(), (false, false));
        assert_eq!(knob.turn_left(), (true, true));
    }

    #[test]
    fn direction_can_change_between_detents() {
        let mut knob = SimulatedKnob::new(false);
        assert_eq!(knob.turn_right(), (true, false));
        assert_eq!(knob.turn_left(), (false, false));
    }
}
