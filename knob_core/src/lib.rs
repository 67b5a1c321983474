#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Interaction event coordinator for the printer knob companion.
//!
//! Turns raw, debounced hardware edge events (two quadrature lines plus a
//! button) into disambiguated user intents and arbitrates between user
//! activity and the idle-triggered status bar. All hardware and network
//! interactions go through the `knob_traits` collaborator traits.
//!
//! ## Architecture
//!
//! - **Encoder**: quadrature direction decode + bounded speed setting
//!   (`encoder` module)
//! - **Clicks**: single vs. double click disambiguation with a
//!   generation-counted deferred check (`clicks` module)
//! - **Idle**: activity clock and status-bar activation/refresh decisions
//!   (`idle` module)
//! - **Dispatch**: slow best-effort acts against the printer API, display
//!   and speech (`dispatch` module)
//! - **Coordinator**: the single owning thread that serializes all decide
//!   steps through one `crossbeam_channel::select!` loop (`coordinator`
//!   module)
//!
//! Decide steps are pure and fast; acts are slow and touch no shared
//! state. Producers stamp events and touch the activity clock before
//! enqueueing, so a blocking act can never starve the debounce timestamps.

pub mod clicks;
pub mod coordinator;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod idle;
pub mod mocks;
pub mod status;

pub use clicks::{ClickDisambiguator, ClickPhase, PressOutcome};
pub use coordinator::{Coordinator, Event, InputHandle};
pub use dispatch::Dispatcher;
pub use encoder::{EdgeOutcome, EncoderDecoder, SpeedSetting, Turn};
pub use error::KnobError;
pub use idle::ActivityClock;
pub use status::StatusView;
