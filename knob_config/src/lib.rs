#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the printer knob companion.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - All timing windows are in milliseconds; `validate()` rejects zero
//!   windows that would break the debounce/disambiguation contracts.

use serde::Deserialize;
use std::time::Duration;

/// BCM pin assignments for the rotary encoder and its push button.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Pins {
    /// Primary encoder line (CLK)
    pub encoder_clk: u8,
    /// Secondary encoder line (DT)
    pub encoder_dt: u8,
    pub button: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            encoder_clk: 13,
            encoder_dt: 26,
            button: 19,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Timing {
    /// Minimum interval between committed knob turns (per-direction-change debounce)
    pub knob_timeout_ms: u64,
    /// Window within which a second press counts as a double click
    pub double_click_ms: u64,
    /// Quiet time before the status bar activates
    pub idle_threshold_ms: u64,
    /// Status bar self-refresh cadence once active
    pub status_refresh_ms: u64,
    /// Idle check cadence
    pub idle_poll_ms: u64,
    /// Settle pause between firmware restart and homing in the confirm action
    pub settle_ms: u64,
    /// Edge-source debounce for the button pin
    pub button_debounce_ms: u64,
    /// Edge-source debounce for the encoder pins
    pub encoder_debounce_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            knob_timeout_ms: 500,
            double_click_ms: 500,
            idle_threshold_ms: 10_000,
            status_refresh_ms: 5_000,
            idle_poll_ms: 1_000,
            settle_ms: 10_000,
            button_debounce_ms: 300,
            encoder_debounce_ms: 50,
        }
    }
}

impl Timing {
    #[inline]
    pub fn knob_timeout(&self) -> Duration {
        Duration::from_millis(self.knob_timeout_ms)
    }
    #[inline]
    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
    #[inline]
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_millis(self.idle_threshold_ms)
    }
    #[inline]
    pub fn status_refresh(&self) -> Duration {
        Duration::from_millis(self.status_refresh_ms)
    }
    #[inline]
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }
    #[inline]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Moonraker {
    /// Base URL of the Moonraker API
    pub url: String,
    /// Per-call HTTP timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for Moonraker {
    fn default() -> Self {
        Self {
            url: "http://localhost:7125".into(),
            timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Display {
    /// Framebuffer device path
    pub device: String,
    pub width: u32,
    pub height: u32,
    /// Directory holding the BMP face assets
    pub asset_dir: String,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            device: "/dev/fb0".into(),
            width: 320,
            height: 240,
            asset_dir: "assets".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechCfg {
    /// Text-to-speech program invoked per phrase
    pub program: String,
    /// Extra arguments passed before the phrase
    pub args: Vec<String>,
}

impl Default for SpeechCfg {
    fn default() -> Self {
        Self {
            program: "espeak".into(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub timing: Timing,
    pub moonraker: Moonraker,
    pub display: Display,
    pub speech: SpeechCfg,
    pub logging: Logging,
}

impl Config {
    /// Reject configurations that would break the timing contracts.
    pub fn validate(&self) -> eyre::Result<()> {
        if self.timing.knob_timeout_ms == 0 {
            eyre::bail!("timing.knob_timeout_ms must be > 0");
        }
        if self.timing.double_click_ms == 0 {
            eyre::bail!("timing.double_click_ms must be > 0");
        }
        if self.timing.idle_poll_ms == 0 {
            eyre::bail!("timing.idle_poll_ms must be > 0");
        }
        if self.timing.status_refresh_ms == 0 {
            eyre::bail!("timing.status_refresh_ms must be > 0");
        }
        if self.timing.idle_threshold_ms < self.timing.idle_poll_ms {
            eyre::bail!("timing.idle_threshold_ms must be >= timing.idle_poll_ms");
        }
        if self.moonraker.url.is_empty() {
            eyre::bail!("moonraker.url must not be empty");
        }
        if self.moonraker.timeout_ms == 0 {
            eyre::bail!("moonraker.timeout_ms must be > 0");
        }
        if self.display.width == 0 || self.display.height == 0 {
            eyre::bail!("display dimensions must be > 0");
        }
        let pins = [
            self.pins.encoder_clk,
            self.pins.encoder_dt,
            self.pins.button,
        ];
        for (i, a) in pins.iter().enumerate() {
            for b in pins.iter().skip(i + 1) {
                if a == b {
                    eyre::bail!("pin {a} assigned to more than one input");
                }
            }
        }
        Ok(())
    }
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}
