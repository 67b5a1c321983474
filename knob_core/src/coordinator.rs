//! The coordinator thread: one ordered queue for every event source.
//!
//! GPIO callbacks, the deferred click check, the 1s idle check and the
//! status-bar refresh chain all converge on a single
//! `crossbeam_channel::select!` loop owned by one thread. That thread
//! is the only owner of the decode state (encoder, speed, clicks), so
//! an edge callback and a firing timer can never interleave. Producers
//! stamp events with their own timestamp and refresh the shared
//! `ActivityClock` before enqueueing: the decide phase always sees
//! enqueue-time truth even when a blocking act delays the drain.

use crate::clicks::{ClickDisambiguator, PressOutcome};
use crate::dispatch::Dispatcher;
use crate::encoder::{EdgeOutcome, EncoderDecoder};
use crate::idle::{self, ActivityClock};
use crossbeam_channel as xch;
use knob_config::Timing;
use knob_traits::{Clock, DisplayPanel, PrinterCommands, PrinterStatus, Speech};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
pub enum Event {
    KnobEdge {
        clk_high: bool,
        dt_high: bool,
        at: Instant,
    },
    ButtonPress {
        at: Instant,
    },
    Shutdown,
}

/// Producer-side handle given to the hardware edge source.
///
/// Cheap to clone; both methods are safe to call from interrupt
/// callback threads. The activity clock is touched before the send so
/// the status bar yields to physical input even while the coordinator
/// is busy in a slow act.
#[derive(Clone)]
pub struct InputHandle {
    tx: xch::Sender<Event>,
    activity: Arc<ActivityClock>,
}

impl InputHandle {
    pub fn knob_edge(&self, clk_high: bool, dt_high: bool) {
        self.knob_edge_at(clk_high, dt_high, Instant::now());
    }

    pub fn knob_edge_at(&self, clk_high: bool, dt_high: bool, at: Instant) {
        self.activity.touch(at);
        if self
            .tx
            .try_send(Event::KnobEdge {
                clk_high,
                dt_high,
                at,
            })
            .is_err()
        {
            tracing::trace!("event queue full or closed; knob edge dropped");
        }
    }

    pub fn button_press(&self) {
        self.button_press_at(Instant::now());
    }

    pub fn button_press_at(&self, at: Instant) {
        self.activity.touch(at);
        if self.tx.try_send(Event::ButtonPress { at }).is_err() {
            tracing::trace!("event queue full or closed; button press dropped");
        }
    }

    /// Ask the coordinator loop to exit.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Event::Shutdown);
    }
}

pub struct Coordinator<D, S, P, C, K> {
    decoder: EncoderDecoder,
    clicks: ClickDisambiguator,
    activity: Arc<ActivityClock>,
    dispatcher: Dispatcher<D, S, P, C, K>,
    timing: Timing,
    tx: xch::Sender<Event>,
    rx: xch::Receiver<Event>,
}

impl<D, S, P, C, K> Coordinator<D, S, P, C, K>
where
    D: DisplayPanel,
    S: Speech,
    P: PrinterStatus,
    C: PrinterCommands,
    K: Clock,
{
    /// `initial_clk_high` is the primary encoder line level sampled at
    /// startup, mirroring how the decoder seeds its transition detector.
    pub fn new(timing: Timing, initial_clk_high: bool, dispatcher: Dispatcher<D, S, P, C, K>) -> Self {
        let (tx, rx) = xch::bounded(64);
        Self {
            decoder: EncoderDecoder::new(initial_clk_high, timing.knob_timeout()),
            clicks: ClickDisambiguator::new(timing.double_click_window()),
            activity: Arc::new(ActivityClock::new()),
            dispatcher,
            timing,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> InputHandle {
        InputHandle {
            tx: self.tx.clone(),
            activity: Arc::clone(&self.activity),
        }
    }

    pub fn activity(&self) -> Arc<ActivityClock> {
        Arc::clone(&self.activity)
    }

    /// Run the event loop until a `Shutdown` event arrives or every
    /// input handle is gone.
    pub fn run(mut self) {
        let idle_tick = xch::tick(self.timing.idle_poll());
        let mut click_deadline: xch::Receiver<Instant> = xch::never();
        let mut pending_click_gen: u64 = 0;
        let mut refresh_at: xch::Receiver<Instant> = xch::never();

        tracing::info!("coordinator loop started");
        loop {
            xch::select! {
                recv(self.rx) -> ev => match ev {
                    Ok(Event::KnobEdge { clk_high, dt_high, at }) => {
                        self.on_knob_edge(clk_high, dt_high, at);
                    }
                    Ok(Event::ButtonPress { at }) => {
                        match self.clicks.on_press(at) {
                            PressOutcome::Scheduled { generation } => {
                                pending_click_gen = generation;
                                click_deadline = xch::after(self.clicks.window());
                            }
                            PressOutcome::DoubleClick => {
                                // Best-effort cancel; the generation
                                // re-check below stays authoritative for
                                // a deadline already in flight.
                                click_deadline = xch::never();
                                tracing::debug!("double click");
                                if self.dispatcher.double_click() {
                                    self.activity.set_status_bar_active(false);
                                }
                            }
                        }
                    }
                    Ok(Event::Shutdown) => break,
                    Err(_) => break,
                },
                recv(click_deadline) -> _ => {
                    click_deadline = xch::never();
                    if self.clicks.confirm_deadline(pending_click_gen) {
                        tracing::debug!("single click confirmed");
                        self.dispatcher.single_click_report();
                    }
                },
                recv(idle_tick) -> _ => {
                    let now = Instant::now();
                    if idle::should_activate(&self.activity, self.timing.idle_threshold(), now)
                        && self.dispatcher.render_status_bar(self.decoder.speed_percent())
                        // The repaint blocks on its fetch; input that
                        // arrived meanwhile already owns the display
                        // again. Only an idle check that still holds
                        // may arm the refresh chain.
                        && idle::should_activate(&self.activity, self.timing.idle_threshold(), Instant::now())
                    {
                        self.activity.set_status_bar_active(true);
                        refresh_at = xch::after(self.timing.status_refresh());
                    }
                },
                recv(refresh_at) -> _ => {
                    // The refresh chain consults the same flag the idle
                    // check does; any input since the last repaint has
                    // already cleared it and the chain stops here.
                    if self.activity.status_bar_active() {
                        let _ = self.dispatcher.render_status_bar(self.decoder.speed_percent());
                        refresh_at = xch::after(self.timing.status_refresh());
                    } else {
                        refresh_at = xch::never();
                    }
                },
            }
        }
        tracing::info!("coordinator loop stopped");
    }

    fn on_knob_edge(&mut self, clk_high: bool, dt_high: bool, at: Instant) {
        match self.decoder.on_edge(clk_high, dt_high, at) {
            EdgeOutcome::Suppressed => {
                tracing::trace!("knob edge inside timeout window");
            }
            EdgeOutcome::NoTransition => {}
            EdgeOutcome::Turned {
                direction,
                committed,
            } => {
                tracing::debug!(?direction, "knob turned");
                if let Some(percent) = committed {
                    self.dispatcher.announce_speed(percent);
                }
            }
        }
    }
}
