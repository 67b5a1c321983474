use knob_config::{Config, load_toml};
use rstest::rstest;

#[test]
fn empty_toml_yields_defaults() {
    let cfg = load_toml("").expect("defaults should parse");
    assert_eq!(cfg.pins.encoder_clk, 13);
    assert_eq!(cfg.pins.encoder_dt, 26);
    assert_eq!(cfg.pins.button, 19);
    assert_eq!(cfg.timing.knob_timeout_ms, 500);
    assert_eq!(cfg.timing.double_click_ms, 500);
    assert_eq!(cfg.timing.idle_threshold_ms, 10_000);
    assert_eq!(cfg.timing.status_refresh_ms, 5_000);
    assert_eq!(cfg.moonraker.url, "http://localhost:7125");
    cfg.validate().expect("defaults should validate");
}

#[test]
fn full_config_round_trips() {
    let toml = r#"
        [pins]
        encoder_clk = 17
        encoder_dt = 27
        button = 22

        [timing]
        knob_timeout_ms = 250
        double_click_ms = 400
        idle_threshold_ms = 8000
        status_refresh_ms = 4000

        [moonraker]
        url = "http://octopi.local:7125"
        timeout_ms = 1500

        [display]
        device = "/dev/fb1"
        width = 480
        height = 320

        [speech]
        program = "espeak-ng"
        args = ["-s", "140"]

        [logging]
        level = "debug"
    "#;
    let cfg = load_toml(toml).expect("should parse");
    assert_eq!(cfg.pins.button, 22);
    assert_eq!(cfg.timing.knob_timeout_ms, 250);
    assert_eq!(cfg.moonraker.url, "http://octopi.local:7125");
    assert_eq!(cfg.display.device, "/dev/fb1");
    assert_eq!(cfg.speech.args, vec!["-s".to_string(), "140".to_string()]);
    assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
    cfg.validate().expect("should validate");
}

#[rstest]
#[case("[timing]\nknob_timeout_ms = 0\n")]
#[case("[timing]\ndouble_click_ms = 0\n")]
#[case("[timing]\nidle_poll_ms = 0\n")]
#[case("[timing]\nstatus_refresh_ms = 0\n")]
#[case("[timing]\nidle_threshold_ms = 100\nidle_poll_ms = 1000\n")]
#[case("[moonraker]\nurl = \"\"\n")]
#[case("[moonraker]\ntimeout_ms = 0\n")]
#[case("[display]\nwidth = 0\n")]
fn invalid_values_are_rejected(#[case] toml: &str) {
    let cfg = load_toml(toml).expect("syntactically valid");
    assert!(cfg.validate().is_err(), "expected rejection for: {toml}");
}

#[test]
fn duplicate_pins_are_rejected() {
    let cfg = load_toml("[pins]\nencoder_clk = 5\nencoder_dt = 5\nbutton = 6\n").unwrap();
    assert!(cfg.validate().is_err());
}

#[test]
fn debounce_and_settle_defaults_are_set() {
    let cfg = Config::default();
    assert_eq!(cfg.timing.settle_ms, 10_000);
    assert_eq!(cfg.timing.button_debounce_ms, 300);
    assert_eq!(cfg.timing.encoder_debounce_ms, 50);
}
