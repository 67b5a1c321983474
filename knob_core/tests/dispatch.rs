use knob_core::Dispatcher;
use knob_core::mocks::{
    ManualClock, RecordingCommands, RecordingDisplay, RecordingSpeech, ScriptedStatus, SentCommand,
};
use knob_traits::{ImageId, PrinterSnapshot, PrinterState};
use rstest::rstest;
use std::time::Duration;

const SETTLE: Duration = Duration::from_secs(10);

fn dispatcher(
    status: ScriptedStatus,
) -> (
    Dispatcher<RecordingDisplay, RecordingSpeech, ScriptedStatus, RecordingCommands, ManualClock>,
    RecordingDisplay,
    RecordingSpeech,
    RecordingCommands,
    ManualClock,
) {
    let display = RecordingDisplay::new();
    let speech = RecordingSpeech::new();
    let commands = RecordingCommands::new();
    let clock = ManualClock::new();
    let d = Dispatcher::with_clock(
        display.clone(),
        speech.clone(),
        status,
        commands.clone(),
        SETTLE,
        clock.clone(),
    );
    (d, display, speech, commands, clock)
}

fn printing(progress: f32) -> PrinterSnapshot {
    let mut s = PrinterSnapshot::with_state(PrinterState::Printing);
    s.progress_percent = Some(progress);
    s
}

#[test]
fn speed_change_issues_command_and_confirms() {
    let (mut d, _, speech, commands, _) = dispatcher(ScriptedStatus::always(printing(10.0)));
    d.announce_speed(105);
    assert_eq!(commands.sent(), vec![SentCommand::SetSpeed(105)]);
    assert_eq!(speech.phrases(), vec!["Print speed set to 105 percent."]);
}

#[test]
fn failed_speed_change_speaks_failure() {
    let (mut d, _, speech, commands, _) = dispatcher(ScriptedStatus::always(printing(10.0)));
    commands.set_failing(true);
    d.announce_speed(95);
    assert_eq!(speech.phrases(), vec!["Failed to change print speed."]);
}

#[test]
fn single_click_while_printing_speaks_progress() {
    let (mut d, display, speech, commands, _) = dispatcher(ScriptedStatus::always(printing(42.57)));
    d.single_click_report();
    assert_eq!(speech.phrases(), vec!["Print progress is 42.57 percent."]);
    assert!(display.frames().is_empty());
    assert!(commands.sent().is_empty());
}

#[rstest]
#[case(PrinterState::Ready, "Status: Ready")]
#[case(PrinterState::Standby, "Status: Standby")]
fn single_click_when_quiet_shows_the_sleepy_face(#[case] state: PrinterState, #[case] text: &str) {
    let (mut d, display, speech, _, _) =
        dispatcher(ScriptedStatus::always(PrinterSnapshot::with_state(state)));
    d.single_click_report();
    assert_eq!(speech.phrases(), vec![text]);
    assert_eq!(display.frames(), vec![(ImageId::Sleepy, text.to_string())]);
}

#[test]
fn single_click_when_complete_shows_the_working_face() {
    let (mut d, display, speech, _, _) = dispatcher(ScriptedStatus::always(
        PrinterSnapshot::with_state(PrinterState::Complete),
    ));
    d.single_click_report();
    assert_eq!(speech.phrases(), vec!["Status: Complete"]);
    assert_eq!(
        display.frames(),
        vec![(ImageId::Working, "Status: Complete".to_string())]
    );
}

#[test]
fn single_click_with_disconnected_controller_restarts_firmware() {
    let mut snap = PrinterSnapshot::with_state(PrinterState::McuDisconnected);
    snap.controller_connected = false;
    let (mut d, _, speech, commands, _) = dispatcher(ScriptedStatus::always(snap));
    d.single_click_report();
    assert_eq!(commands.sent(), vec![SentCommand::RestartFirmware]);
    assert_eq!(
        speech.phrases(),
        vec!["MCU disconnected. Restarting firmware.", "Firmware restarted."]
    );
}

#[test]
fn single_click_during_startup_renders_but_issues_no_restart() {
    let mut snap = PrinterSnapshot::with_state(PrinterState::Startup);
    snap.controller_starting_up = true;
    let (mut d, display, speech, commands, _) = dispatcher(ScriptedStatus::always(snap));
    d.single_click_report();
    assert!(commands.sent().is_empty());
    assert_eq!(speech.phrases(), vec!["MCU is starting up. Please wait."]);
    assert_eq!(
        display.frames(),
        vec![(ImageId::ClosedMouth, "MCU is starting up...".to_string())]
    );
}

#[test]
fn single_click_on_unmodelled_state_speaks_generic_phrase() {
    let (mut d, display, speech, _, _) = dispatcher(ScriptedStatus::always(
        PrinterSnapshot::with_state(PrinterState::Other("error".into())),
    ));
    d.single_click_report();
    assert_eq!(speech.phrases(), vec!["The printer status is error."]);
    assert!(display.frames().is_empty());
}

#[test]
fn single_click_fetch_failure_is_a_silent_skip() {
    let (mut d, display, speech, commands, _) =
        dispatcher(ScriptedStatus::always_failing("connection refused"));
    d.single_click_report();
    assert!(speech.phrases().is_empty());
    assert!(display.frames().is_empty());
    assert!(commands.sent().is_empty());
}

#[test]
fn double_click_while_printing_pauses() {
    let (mut d, _, speech, commands, _) = dispatcher(ScriptedStatus::always(printing(50.0)));
    assert!(!d.double_click());
    assert_eq!(commands.sent(), vec![SentCommand::Pause]);
    assert_eq!(speech.phrases(), vec!["Print paused."]);
}

#[test]
fn double_click_while_paused_resumes() {
    let (mut d, _, speech, commands, _) = dispatcher(ScriptedStatus::always(
        PrinterSnapshot::with_state(PrinterState::Paused),
    ));
    assert!(!d.double_click());
    assert_eq!(commands.sent(), vec![SentCommand::Resume]);
    assert_eq!(speech.phrases(), vec!["Print resumed."]);
}

#[test]
fn double_click_when_complete_runs_the_confirm_sequence_in_order() {
    let (mut d, display, _, commands, clock) = dispatcher(ScriptedStatus::always(
        PrinterSnapshot::with_state(PrinterState::Complete),
    ));
    assert!(d.double_click());
    assert_eq!(
        commands.sent(),
        vec![
            SentCommand::RestartFirmware,
            SentCommand::HomeAll,
            SentCommand::ClearStats,
        ]
    );
    // The settle pause sits between the restart and the homing step.
    assert_eq!(clock.elapsed(), SETTLE);
    let frames = display.frames();
    assert_eq!(
        frames,
        vec![
            (ImageId::Working, "Restarting firmware...".to_string()),
            (ImageId::Working, "Homing all axes".to_string()),
        ]
    );
}

#[test]
fn confirm_sequence_runs_every_step_despite_failures() {
    let (mut d, display, speech, commands, _) = dispatcher(ScriptedStatus::always(
        PrinterSnapshot::with_state(PrinterState::Complete),
    ));
    commands.set_failing(true);
    assert!(d.double_click());
    assert_eq!(
        commands.sent(),
        vec![
            SentCommand::RestartFirmware,
            SentCommand::HomeAll,
            SentCommand::ClearStats,
        ]
    );
    assert_eq!(
        speech.phrases(),
        vec![
            "Failed to restart firmware.",
            "Failed to home all axes.",
            "Failed to clear print stats.",
        ]
    );
    assert_eq!(display.frames().len(), 2);
}

#[test]
fn pause_toggle_in_ready_state_reports_progress() {
    let mut snap = PrinterSnapshot::with_state(PrinterState::Ready);
    snap.progress_percent = Some(12.25);
    let (mut d, _, speech, commands, _) = dispatcher(ScriptedStatus::always(snap));
    d.pause_or_resume();
    assert!(commands.sent().is_empty());
    assert_eq!(
        speech.phrases(),
        vec!["Printer is in ready state. Print progress is 12.25 percent."]
    );
}

#[test]
fn status_bar_repaint_skips_silently_on_fetch_failure() {
    let (mut d, display, speech, _, _) = dispatcher(ScriptedStatus::always_failing("timeout"));
    assert!(!d.render_status_bar(100));
    assert!(display.frames().is_empty());
    assert!(speech.phrases().is_empty());
}

#[test]
fn status_bar_repaint_draws_the_mapped_view() {
    let (mut d, display, _, _, _) = dispatcher(ScriptedStatus::always(printing(75.25)));
    assert!(d.render_status_bar(120));
    assert_eq!(
        display.frames(),
        vec![(ImageId::ClosedMouth, "%: 75.25  S: 120  T: printing".to_string())]
    );
}
