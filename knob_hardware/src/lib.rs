#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Peripheral implementations for the printer knob companion.
//!
//! - `fb`: framebuffer display rendering BMP faces with a caption.
//! - `speech`: blocking text-to-speech via an external program, with
//!   the talking-face animation on the shared panel.
//! - `sim`: console/keyboard stand-ins for development off the Pi.
//! - `edge` (feature `hardware`, Linux only): rppal GPIO interrupts for
//!   the encoder and button.

pub mod error;
pub mod fb;
pub mod sim;
pub mod speech;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod edge;

pub use error::HwError;
pub use fb::FramebufferDisplay;
pub use sim::{ConsoleDisplay, ConsoleSpeech, SimulatedKnob};
pub use speech::{AnimatedSpeech, SharedPanel};

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use edge::GpioEdgeSource;
