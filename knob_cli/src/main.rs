#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Binary entry point: config loading, tracing setup and the wiring of
//! peripherals to the interaction coordinator.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD};
use eyre::{Result, WrapErr};
use knob_config::Config;
use knob_core::{Coordinator, Dispatcher};
use knob_moonraker::MoonrakerClient;
use knob_traits::PrinterStatus;
use std::fs;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg.logging)?;
    match cli.cmd {
        Commands::Run => run(cfg),
        Commands::SelfCheck => self_check(&cfg),
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let cfg = knob_config::load_toml(&text)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Console layer honoring `--json`/`--log-level`, plus an optional JSON
/// lines file with never/daily/hourly rotation. `RUST_LOG` wins over both.
fn init_tracing(cli: &Cli, logging: &knob_config::Logging) -> Result<()> {
    let level = logging
        .level
        .clone()
        .unwrap_or_else(|| cli.log_level.clone());
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&level))?;

    let console = if cli.json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let file = match &logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
    Ok(())
}

fn self_check(cfg: &Config) -> Result<()> {
    let mut status = MoonrakerClient::new(&cfg.moonraker);
    let snap = status
        .fetch_snapshot()
        .map_err(|e| eyre::eyre!("Moonraker unreachable at {}: {e}", cfg.moonraker.url))?;
    println!(
        "config ok; printer state: {}, progress: {}",
        snap.state,
        snap.progress_percent
            .map_or_else(|| "n/a".to_string(), |p| format!("{p:.1}%")),
    );
    Ok(())
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn run(cfg: Config) -> Result<()> {
    use knob_hardware::{AnimatedSpeech, FramebufferDisplay, GpioEdgeSource, SharedPanel};

    let client = MoonrakerClient::new(&cfg.moonraker);
    // Speech animates the mouth on the same panel the dispatcher draws to.
    let panel = SharedPanel::new(FramebufferDisplay::new(&cfg.display));
    let speech = AnimatedSpeech::new(&cfg.speech, panel.clone());
    let dispatcher = Dispatcher::new(panel, speech, client.clone(), client, cfg.timing.settle());

    let mut edges = GpioEdgeSource::open(&cfg.pins).map_err(|e| eyre::eyre!(e))?;
    let coordinator = Coordinator::new(cfg.timing, edges.initial_clk_high(), dispatcher);
    let handle = coordinator.handle();

    let knob_handle = handle.clone();
    let button_handle = handle.clone();
    edges
        .watch(
            &cfg.timing,
            move |clk_high, dt_high| knob_handle.knob_edge(clk_high, dt_high),
            move || button_handle.button_press(),
        )
        .map_err(|e| eyre::eyre!(e))?;

    let ctrlc_handle = handle.clone();
    ctrlc::set_handler(move || ctrlc_handle.shutdown())
        .wrap_err("failed to install signal handler")?;

    tracing::info!("interaction loop running");
    coordinator.run();
    drop(edges);
    Ok(())
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn run(cfg: Config) -> Result<()> {
    use knob_hardware::{ConsoleDisplay, ConsoleSpeech, SimulatedKnob};
    use std::io::BufRead;

    let client = MoonrakerClient::new(&cfg.moonraker);
    let dispatcher = Dispatcher::new(
        ConsoleDisplay,
        ConsoleSpeech,
        client.clone(),
        client,
        cfg.timing.settle(),
    );
    let coordinator = Coordinator::new(cfg.timing, true, dispatcher);
    let handle = coordinator.handle();

    let ctrlc_handle = handle.clone();
    ctrlc::set_handler(move || ctrlc_handle.shutdown())
        .wrap_err("failed to install signal handler")?;

    let join = std::thread::spawn(move || coordinator.run());

    println!("simulated panel: r = right turn, l = left turn, b = button, q = quit");
    let mut knob = SimulatedKnob::new(true);
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "r" => {
                let (clk_high, dt_high) = knob.turn_right();
                handle.knob_edge(clk_high, dt_high);
            }
            "l" => {
                let (clk_high, dt_high) = knob.turn_left();
                handle.knob_edge(clk_high, dt_high);
            }
            "b" => handle.button_press(),
            "q" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    handle.shutdown();
    join.join()
        .map_err(|_| eyre::eyre!("coordinator thread panicked"))?;
    Ok(())
}
