#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Moonraker HTTP client for status queries and printer commands.
//!
//! Every trait call is a single blocking request with the configured
//! timeout and no retry; callers decide how to react to failures.

use knob_traits::{PrinterCommands, PrinterSnapshot, PrinterState, PrinterStatus};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoonrakerError {
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("unreadable response from {endpoint}: {source}")]
    Body {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Blocking Moonraker API client. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct MoonrakerClient {
    agent: ureq::Agent,
    base: String,
}

impl MoonrakerClient {
    pub fn new(cfg: &knob_config::Moonraker) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build();
        Self {
            agent,
            base: cfg.url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }

    fn get_json(&self, path: &str, query: Option<&str>) -> Result<Value, MoonrakerError> {
        let url = self.url(path);
        let mut req = self.agent.get(&url);
        if let Some(object) = query {
            req = req.query(object, "");
        }
        let resp = req.call().map_err(|e| MoonrakerError::Request {
            endpoint: path.to_string(),
            source: Box::new(e),
        })?;
        resp.into_json().map_err(|e| MoonrakerError::Body {
            endpoint: path.to_string(),
            source: e,
        })
    }

    fn post(&self, path: &str) -> Result<(), MoonrakerError> {
        let url = self.url(path);
        self.agent
            .post(&url)
            .call()
            .map_err(|e| MoonrakerError::Request {
                endpoint: path.to_string(),
                source: Box::new(e),
            })?;
        tracing::debug!(path, "command accepted");
        Ok(())
    }

    fn run_gcode(&self, script: &str) -> Result<(), MoonrakerError> {
        let url = self.url("printer/gcode/script");
        self.agent
            .post(&url)
            .query("script", script)
            .call()
            .map_err(|e| MoonrakerError::Request {
                endpoint: "printer/gcode/script".to_string(),
                source: Box::new(e),
            })?;
        tracing::debug!(script, "gcode accepted");
        Ok(())
    }
}

/// Job state string as reported in `print_stats.state`.
fn parse_job_state(s: &str) -> PrinterState {
    match s {
        "printing" => PrinterState::Printing,
        "paused" => PrinterState::Paused,
        "ready" => PrinterState::Ready,
        "standby" => PrinterState::Standby,
        "complete" => PrinterState::Complete,
        other => PrinterState::Other(other.to_string()),
    }
}

/// Combines the three Moonraker answers into one snapshot.
///
/// The Klipper host state overrides the job state: an errored host means
/// the MCU is unreachable regardless of what the last job said, and a
/// starting host is reported as such.
fn snapshot_from_parts(job_state: &str, progress: f64, host_state: &str) -> PrinterSnapshot {
    let percent = ((progress * 100.0) * 100.0).round() as f32 / 100.0;
    let (state, connected, starting) = if host_state.contains("error") {
        (PrinterState::McuDisconnected, false, false)
    } else if host_state.contains("startup") {
        (PrinterState::Startup, true, true)
    } else {
        (parse_job_state(job_state), true, false)
    };
    PrinterSnapshot {
        state,
        progress_percent: Some(percent),
        controller_connected: connected,
        controller_starting_up: starting,
    }
}

fn str_at<'a>(v: &'a Value, pointer: &str) -> &'a str {
    v.pointer(pointer).and_then(Value::as_str).unwrap_or("unknown")
}

impl PrinterStatus for MoonrakerClient {
    fn fetch_snapshot(&mut self) -> Result<PrinterSnapshot, BoxError> {
        let stats = self.get_json("printer/objects/query", Some("print_stats"))?;
        let job_state = str_at(&stats, "/result/status/print_stats/state");

        let sdcard = self.get_json("printer/objects/query", Some("virtual_sdcard"))?;
        let progress = sdcard
            .pointer("/result/status/virtual_sdcard/progress")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        let info = self.get_json("printer/info", None)?;
        let host_state = str_at(&info, "/result/state");

        let snapshot = snapshot_from_parts(job_state, progress, host_state);
        tracing::trace!(state = %snapshot.state, ?snapshot.progress_percent, "snapshot fetched");
        Ok(snapshot)
    }
}

impl PrinterCommands for MoonrakerClient {
    fn set_speed(&mut self, percent: u16) -> Result<(), BoxError> {
        self.run_gcode(&format!("M220 S{percent}")).map_err(Into::into)
    }

    fn pause(&mut self) -> Result<(), BoxError> {
        self.post("printer/print/pause").map_err(Into::into)
    }

    fn resume(&mut self) -> Result<(), BoxError> {
        self.post("printer/print/resume").map_err(Into::into)
    }

    fn restart_firmware(&mut self) -> Result<(), BoxError> {
        self.post("printer/firmware_restart").map_err(Into::into)
    }

    fn home_all(&mut self) -> Result<(), BoxError> {
        self.run_gcode("G28").map_err(Into::into)
    }

    fn clear_stats(&mut self) -> Result<(), BoxError> {
        self.post("printer/print/clear").map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("printing", PrinterState::Printing)]
    #[case("paused", PrinterState::Paused)]
    #[case("ready", PrinterState::Ready)]
    #[case("standby", PrinterState::Standby)]
    #[case("complete", PrinterState::Complete)]
    #[case("cancelled", PrinterState::Other("cancelled".into()))]
    fn job_states_map_to_the_modelled_set(#[case] raw: &str, #[case] expected: PrinterState) {
        assert_eq!(parse_job_state(raw), expected);
    }

    #[test]
    fn healthy_host_passes_the_job_state_through() {
        let snap = snapshot_from_parts("printing", 0.4257, "ready");
        assert_eq!(snap.state, PrinterState::Printing);
        assert_eq!(snap.progress_percent, Some(42.57));
        assert!(snap.controller_connected);
        assert!(!snap.controller_starting_up);
    }

    #[test]
    fn errored_host_overrides_the_job_state() {
        let snap = snapshot_from_parts("printing", 0.5, "error: mcu unreachable");
        assert_eq!(snap.state, PrinterState::McuDisconnected);
        assert!(!snap.controller_connected);
    }

    #[test]
    fn starting_host_is_reported_as_startup() {
        let snap = snapshot_from_parts("standby", 0.0, "startup");
        assert_eq!(snap.state, PrinterState::Startup);
        assert!(snap.controller_connected);
        assert!(snap.controller_starting_up);
    }

    #[test]
    fn payload_fields_are_extracted_by_pointer() {
        let stats: Value = serde_json::from_str(
            r#"{"result":{"status":{"print_stats":{"state":"printing","filename":"x.gcode"}}}}"#,
        )
        .unwrap();
        assert_eq!(str_at(&stats, "/result/status/print_stats/state"), "printing");

        let info: Value =
            serde_json::from_str(r#"{"result":{"state":"ready","hostname":"pi"}}"#).unwrap();
        assert_eq!(str_at(&info, "/result/state"), "ready");
    }

    #[test]
    fn missing_fields_fall_back_to_unknown() {
        let empty: Value = serde_json::from_str("{}").unwrap();
        assert_eq!(str_at(&empty, "/result/state"), "unknown");
        let snap = snapshot_from_parts("unknown", 0.0, "unknown");
        assert_eq!(snap.state, PrinterState::Other("unknown".into()));
    }
}
