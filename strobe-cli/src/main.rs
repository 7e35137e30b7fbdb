//! # Strobe - Command-Line Strobe Tuner
//!
//! Opens the default audio input and prints the strobe wheels for the chosen
//! scale on every polling tick.
//!
//! ## Architecture
//! - **Audio callback**: writes captured frames into the lock-free capture ring
//! - **Main thread**: polls the engine on a crossbeam tick and prints snapshots
//! - **Errors**: stream errors arrive over a crossbeam channel; only a lost
//!   device ends the run

mod cli;
mod display;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use strobe_core::{StrobeEngine, audio, pitch, scale, temperament};

use cli::Args;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        print_catalogs();
        return Ok(());
    }

    let config = args.engine_config()?;
    let mut engine = StrobeEngine::new(config.clone()).context("failed to build the strobe engine")?;

    log::info!("[MAIN] Connecting audio input...");
    let (input, reader) =
        audio::connect_input(config.buffer_seconds).context("failed to connect audio input")?;
    log::info!(
        "[MAIN] Capturing from {} at {} Hz",
        input.device_name(),
        input.sample_rate()
    );
    engine.connect(reader);

    let ticker = crossbeam_channel::tick(Duration::from_millis(config.poll_interval_ms));
    let deadline = match args.duration {
        Some(seconds) => crossbeam_channel::after(
            Duration::try_from_secs_f32(seconds).context("--duration must be a positive number of seconds")?,
        ),
        None => crossbeam_channel::never(),
    };

    loop {
        crossbeam_channel::select! {
            recv(ticker) -> _ => {
                if engine.poll() {
                    report(&engine, args.json)?;
                }
            },
            recv(input.errors()) -> msg => match msg {
                Ok(err) if !audio::is_fatal(&err) => {
                    log::warn!("[MAIN] Audio stream error, still capturing: {err}");
                }
                Ok(err) => {
                    log::error!("[MAIN] Audio device lost: {err}");
                    engine.disconnect();
                    break;
                }
                Err(_) => {
                    log::error!("[MAIN] Audio stream closed");
                    engine.disconnect();
                    break;
                }
            },
            recv(deadline) -> _ => {
                log::info!("[MAIN] Duration elapsed");
                break;
            },
        }
    }

    if let Err(e) = input.pause() {
        log::warn!("[MAIN] Could not stop the input stream: {e}");
    }
    log::info!("[MAIN] Finished");
    Ok(())
}

fn report(engine: &StrobeEngine, json: bool) -> anyhow::Result<()> {
    let snapshot = engine.snapshot();
    if json {
        println!("{}", serde_json::to_string(&snapshot).context("failed to encode snapshot")?);
    } else {
        print!("{}", display::render(&snapshot));
    }
    Ok(())
}

fn print_catalogs() {
    print!("{}", catalog_listing());
}

/// Temperaments, scales and reference pitches, each with the number the
/// matching flag takes.
fn catalog_listing() -> String {
    let mut out = String::from("Temperaments:\n");
    for (i, t) in temperament::catalog().iter().enumerate() {
        out.push_str(&format!("  {i:>2}  {}\n", t.name));
    }
    out.push_str("Scales:\n");
    for (i, s) in scale::catalog().iter().enumerate() {
        out.push_str(&format!("  {i:>2}  {:<24} {}\n", s.name, s.pitches.join(" ")));
    }
    out.push_str("Reference pitches:\n");
    for (octave, names) in pitch::pitch_names().chunks(12).enumerate() {
        let row: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{:>3} {name:<8}", octave * 12 + i))
            .collect();
        out.push_str(&format!("  {}\n", row.join("").trim_end()));
    }
    out
}
