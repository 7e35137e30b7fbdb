//! Command-line argument parsing.

use anyhow::{Context, bail};
use clap::Parser;
use strobe_core::{EngineConfig, pitch};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "strobe")]
#[command(about = "Strobe tuner for the default audio input", long_about = None)]
pub struct Args {
    /// Temperament, by catalog index (see --list)
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub temperament: usize,

    /// Scale, by catalog index (see --list)
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub scale: usize,

    /// Reference pitch as a name (A4, C#3, Bb2) or MIDI number
    #[arg(long, value_name = "PITCH", default_value = "A4")]
    pub reference_pitch: String,

    /// Frequency of the reference pitch
    #[arg(long, value_name = "HZ", default_value_t = 440.0)]
    pub reference_frequency: f32,

    /// Keep every wheel lit instead of highlighting the best match
    #[arg(long)]
    pub no_autoselect: bool,

    /// Length of the capture ring
    #[arg(long, value_name = "SECONDS", default_value_t = 0.2)]
    pub buffer_seconds: f32,

    /// Polling interval
    #[arg(long, value_name = "MS", default_value_t = 50)]
    pub poll_ms: u64,

    /// Polling cycles averaged into each wheel's instability
    #[arg(long, value_name = "CYCLES", default_value_t = 6)]
    pub history_depth: usize,

    /// Print one JSON snapshot per poll instead of the text display
    #[arg(long)]
    pub json: bool,

    /// Print the temperament and scale catalogs and exit
    #[arg(long)]
    pub list: bool,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,
}

impl Args {
    /// Builds and validates the engine configuration.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let config = EngineConfig {
            temperament: self.temperament,
            scale: self.scale,
            reference_pitch: parse_pitch(&self.reference_pitch)?,
            reference_frequency: self.reference_frequency,
            autoselect: !self.no_autoselect,
            buffer_seconds: self.buffer_seconds,
            poll_interval_ms: self.poll_ms,
            history_depth: self.history_depth,
        };
        config.validate().context("invalid tuning configuration")?;
        if config.poll_interval_ms == 0 {
            bail!("--poll-ms must be at least 1");
        }
        Ok(config)
    }
}

/// Accepts either a MIDI number or a pitch name.
fn parse_pitch(text: &str) -> anyhow::Result<usize> {
    if let Ok(note) = text.trim().parse::<usize>() {
        return Ok(note);
    }
    let note = pitch::note_number_of(text).with_context(|| format!("bad --reference-pitch '{text}'"))?;
    Ok(note as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("strobe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_the_engine() {
        assert_eq!(parse(&[]).engine_config().unwrap(), EngineConfig::default());
    }

    #[test]
    fn reference_pitch_by_name_or_number() {
        assert_eq!(parse_pitch("A4").unwrap(), 69);
        assert_eq!(parse_pitch("Bb3").unwrap(), 58);
        assert_eq!(parse_pitch("60").unwrap(), 60);
        assert!(parse_pitch("H2").is_err());
    }

    #[test]
    fn out_of_range_values_are_refused() {
        assert!(parse(&["--scale", "40"]).engine_config().is_err());
        assert!(parse(&["--reference-pitch", "300"]).engine_config().is_err());
        assert!(parse(&["--history-depth", "0"]).engine_config().is_err());
        assert!(parse(&["--poll-ms", "0"]).engine_config().is_err());
    }

    #[test]
    fn flags_reach_the_config() {
        let config = parse(&["--no-autoselect", "--temperament", "3", "--reference-frequency", "415"])
            .engine_config()
            .unwrap();
        assert!(!config.autoselect);
        assert_eq!(config.temperament, 3);
        assert_eq!(config.reference_frequency, 415.0);
    }
}
