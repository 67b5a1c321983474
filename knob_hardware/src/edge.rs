//! GPIO edge source for the rotary encoder and its push button.
//!
//! `open` acquires the pins so the CLK level can seed the quadrature
//! decoder before any callback fires; `watch` then wires the interrupt
//! handlers. Callbacks run on rppal's poll thread: they only read the
//! paired DT line, apply a minimum-interval debounce and forward the
//! edge to the injected closures. Dropping the source clears the
//! interrupts.

use crate::error::HwError;
use knob_config::{Pins, Timing};
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct GpioEdgeSource {
    clk: InputPin,
    dt: Arc<InputPin>,
    button: InputPin,
}

impl GpioEdgeSource {
    /// Acquires the configured pins with pull-ups enabled.
    pub fn open(pins: &Pins) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let clk = gpio
            .get(pins.encoder_clk)
            .map_err(|e| HwError::Gpio(format!("clk pin {}: {e}", pins.encoder_clk)))?
            .into_input_pullup();
        let dt = Arc::new(
            gpio.get(pins.encoder_dt)
                .map_err(|e| HwError::Gpio(format!("dt pin {}: {e}", pins.encoder_dt)))?
                .into_input_pullup(),
        );
        let button = gpio
            .get(pins.button)
            .map_err(|e| HwError::Gpio(format!("button pin {}: {e}", pins.button)))?
            .into_input_pullup();
        tracing::info!(
            clk = pins.encoder_clk,
            dt = pins.encoder_dt,
            button = pins.button,
            "gpio edge source opened"
        );
        Ok(Self { clk, dt, button })
    }

    /// CLK level right now; seeds the quadrature decoder.
    pub fn initial_clk_high(&self) -> bool {
        self.clk.is_high()
    }

    /// Wires the interrupt callbacks. Call once.
    pub fn watch(
        &mut self,
        timing: &Timing,
        mut on_knob_edge: impl FnMut(bool, bool) + Send + 'static,
        mut on_button: impl FnMut() + Send + 'static,
    ) -> Result<(), HwError> {
        let min_interval = Duration::from_millis(timing.encoder_debounce_ms);
        let dt_line = Arc::clone(&self.dt);
        let mut last_edge: Option<Instant> = None;
        self.clk
            .set_async_interrupt(Trigger::Both, move |level: Level| {
                let now = Instant::now();
                if last_edge.is_some_and(|t| now.duration_since(t) < min_interval) {
                    return;
                }
                last_edge = Some(now);
                on_knob_edge(level == Level::High, dt_line.is_high());
            })
            .map_err(|e| HwError::Gpio(format!("clk interrupt: {e}")))?;

        let press_interval = Duration::from_millis(timing.button_debounce_ms);
        let mut last_press: Option<Instant> = None;
        // Pull-up wiring: a press pulls the line low.
        self.button
            .set_async_interrupt(Trigger::FallingEdge, move |_| {
                let now = Instant::now();
                if last_press.is_some_and(|t| now.duration_since(t) < press_interval) {
                    return;
                }
                last_press = Some(now);
                on_button();
            })
            .map_err(|e| HwError::Gpio(format!("button interrupt: {e}")))?;
        Ok(())
    }
}
