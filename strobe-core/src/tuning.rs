//! # Tuning Table
//!
//! Maps every MIDI note to a target frequency for the active temperament.
//!
//! ## Features
//! - 128-note frequency table (MIDI 0-127)
//! - Equal, syntonic (circle of fifths) and just temperaments
//! - Movable reference pitch and reference frequency
//! - Pitch name lookups through [`crate::pitch`]
//!
//! ## Construction
//! The reference pitch is set to the reference frequency and the eleven
//! notes above it come from the temperament. Every other note is reached by
//! doubling upward or halving downward from that base octave, so
//! `frequency(n + 12) == 2 * frequency(n)` holds exactly for all notes.

use serde::Serialize;

use crate::error::{ConfigurationError, LookupError};
use crate::pitch::{self, NOTE_COUNT};
use crate::temperament::{self, Temperament};

/// The MIDI note of A4.
pub const DEFAULT_REFERENCE_PITCH: u8 = 69;
/// Concert pitch in Hz.
pub const DEFAULT_REFERENCE_FREQUENCY: f32 = 440.0;

/// The complete tuning configuration. Replaced as a whole on every change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TuningState {
    pub temperament_index: usize,
    pub reference_pitch: u8,
    pub reference_frequency: f32,
}

impl Default for TuningState {
    fn default() -> Self {
        Self {
            temperament_index: 0,
            reference_pitch: DEFAULT_REFERENCE_PITCH,
            reference_frequency: DEFAULT_REFERENCE_FREQUENCY,
        }
    }
}

/// Frequencies for all 128 MIDI notes under one [`TuningState`].
#[derive(Debug, Clone)]
pub struct TuningTable {
    temperaments: Vec<Temperament>,
    state: TuningState,
    frequencies: [f32; NOTE_COUNT],
}

impl Default for TuningTable {
    fn default() -> Self {
        let temperaments = temperament::catalog();
        let state = TuningState::default();
        let frequencies = compute_frequencies(
            &temperaments[state.temperament_index],
            state.reference_pitch as usize,
            state.reference_frequency,
        );
        Self {
            temperaments,
            state,
            frequencies,
        }
    }
}

impl TuningTable {
    /// Creates a table for 12-edo with A4 = 440 Hz.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets all three tuning parameters at once and recomputes the table.
    ///
    /// Nothing changes if any parameter is invalid.
    pub fn configure(
        &mut self,
        temperament_index: usize,
        reference_pitch: usize,
        reference_frequency: f32,
    ) -> Result<bool, ConfigurationError> {
        let reference_pitch = checked_pitch(reference_pitch)?;
        self.apply(TuningState {
            temperament_index,
            reference_pitch,
            reference_frequency,
        })
    }

    /// Selects a temperament by catalog index. Returns whether anything changed.
    pub fn set_temperament(&mut self, index: usize) -> Result<bool, ConfigurationError> {
        self.apply(TuningState {
            temperament_index: index,
            ..self.state
        })
    }

    /// Moves the reference pitch (MIDI 0-127). Returns whether anything changed.
    pub fn set_reference_pitch(&mut self, pitch: usize) -> Result<bool, ConfigurationError> {
        let reference_pitch = checked_pitch(pitch)?;
        self.apply(TuningState {
            reference_pitch,
            ..self.state
        })
    }

    /// Sets the frequency of the reference pitch. Returns whether anything changed.
    pub fn set_reference_frequency(&mut self, hz: f32) -> Result<bool, ConfigurationError> {
        self.apply(TuningState {
            reference_frequency: hz,
            ..self.state
        })
    }

    fn apply(&mut self, next: TuningState) -> Result<bool, ConfigurationError> {
        let temperament = self.temperaments.get(next.temperament_index).ok_or(
            ConfigurationError::TemperamentIndex {
                index: next.temperament_index,
                count: self.temperaments.len(),
            },
        )?;
        if !(next.reference_frequency.is_finite() && next.reference_frequency > 0.0) {
            return Err(ConfigurationError::ReferenceFrequency(next.reference_frequency));
        }
        if next == self.state {
            return Ok(false);
        }

        self.frequencies = compute_frequencies(
            temperament,
            next.reference_pitch as usize,
            next.reference_frequency,
        );
        self.state = next;

        log::info!(
            "[TUNING] {} with {} = {} Hz",
            temperament.name,
            pitch::name_of(next.reference_pitch as usize).unwrap_or("?"),
            next.reference_frequency
        );
        Ok(true)
    }

    /// Target frequency of a MIDI note.
    pub fn frequency_of(&self, note: usize) -> Result<f32, LookupError> {
        self.frequencies
            .get(note)
            .copied()
            .ok_or(LookupError::OutOfRange(note))
    }

    /// MIDI note for a pitch name such as `A4`, `C#3` or `Bb2`.
    pub fn note_number_of(&self, name: &str) -> Result<u8, LookupError> {
        pitch::note_number_of(name)
    }

    /// Primary display name of a MIDI note.
    pub fn name_of(&self, note: usize) -> Result<&'static str, LookupError> {
        pitch::name_of(note)
    }

    pub fn frequencies(&self) -> &[f32; NOTE_COUNT] {
        &self.frequencies
    }

    pub fn state(&self) -> TuningState {
        self.state
    }

    pub fn temperaments(&self) -> &[Temperament] {
        &self.temperaments
    }

    /// The active temperament.
    pub fn temperament(&self) -> &Temperament {
        // The index is validated before it is ever stored.
        &self.temperaments[self.state.temperament_index]
    }
}

fn checked_pitch(pitch: usize) -> Result<u8, ConfigurationError> {
    if pitch < NOTE_COUNT {
        Ok(pitch as u8)
    } else {
        Err(ConfigurationError::ReferencePitch(pitch))
    }
}

/// Builds the full table from the temperament's base octave.
fn compute_frequencies(
    temperament: &Temperament,
    reference_pitch: usize,
    reference_frequency: f32,
) -> [f32; NOTE_COUNT] {
    let ratios = temperament.octave_ratios();

    // Kept whole even when it runs past note 127, so halving below stays exact.
    let mut base = [reference_frequency; 12];
    for (freq, ratio) in base.iter_mut().zip(ratios.iter()).skip(1) {
        *freq = (reference_frequency as f64 * ratio) as f32;
    }

    let mut frequencies = [0.0; NOTE_COUNT];
    for note in reference_pitch..NOTE_COUNT {
        let offset = note - reference_pitch;
        frequencies[note] = if offset < 12 {
            base[offset]
        } else {
            frequencies[note - 12] * 2.0
        };
    }
    for note in (0..reference_pitch).rev() {
        let above = note + 12;
        let upper = if above < NOTE_COUNT {
            frequencies[above]
        } else {
            base[above - reference_pitch]
        };
        frequencies[note] = upper * 0.5;
    }
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn concert_pitch_equal_temperament() {
        let table = TuningTable::new();
        assert_eq!(table.frequency_of(69).unwrap(), 440.0);
        assert_eq!(table.frequency_of(81).unwrap(), 880.0);
        assert_eq!(table.frequency_of(57).unwrap(), 220.0);
        assert_relative_eq!(table.frequency_of(60).unwrap(), 261.6256, epsilon = 1e-3);
    }

    #[test]
    fn octaves_double_exactly_for_every_temperament() {
        let mut table = TuningTable::new();
        for index in 0..table.temperaments().len() {
            for reference in [0, 21, 69, 116, 120, 127] {
                table.configure(index, reference, 431.7).unwrap();
                for n in 0..=115 {
                    assert_eq!(
                        table.frequency_of(n + 12).unwrap(),
                        2.0 * table.frequency_of(n).unwrap(),
                        "temperament {index}, reference {reference}, note {n}"
                    );
                }
            }
        }
    }

    #[test]
    fn reference_note_is_exact() {
        let mut table = TuningTable::new();
        table.configure(12, 127, 12543.85).unwrap();
        assert_eq!(table.frequency_of(127).unwrap(), 12543.85);
        table.configure(4, 0, 8.0).unwrap();
        assert_eq!(table.frequency_of(0).unwrap(), 8.0);
        assert_eq!(table.frequency_of(120).unwrap(), 8.0 * 1024.0);
    }

    #[test]
    fn just_fifth_above_reference() {
        let mut table = TuningTable::new();
        table.configure(12, 60, 256.0).unwrap();
        assert_relative_eq!(table.frequency_of(67).unwrap(), 384.0);
        assert_relative_eq!(table.frequency_of(64).unwrap(), 320.0);
    }

    #[test]
    fn rejected_changes_leave_table_untouched() {
        let mut table = TuningTable::new();
        let before = *table.frequencies();

        assert_eq!(
            table.set_temperament(99),
            Err(ConfigurationError::TemperamentIndex { index: 99, count: 24 })
        );
        assert_eq!(
            table.set_reference_pitch(128),
            Err(ConfigurationError::ReferencePitch(128))
        );
        assert!(table.set_reference_frequency(0.0).is_err());
        assert!(table.set_reference_frequency(f32::NAN).is_err());
        assert!(table.configure(3, 60, -1.0).is_err());

        assert_eq!(table.state(), TuningState::default());
        assert_eq!(*table.frequencies(), before);
    }

    #[test]
    fn repeated_settings_are_idempotent() {
        let mut table = TuningTable::new();
        assert!(table.set_reference_frequency(442.0).unwrap());
        let after_first = *table.frequencies();
        assert!(!table.set_reference_frequency(442.0).unwrap());
        assert_eq!(*table.frequencies(), after_first);
        assert!(!table.set_temperament(0).unwrap());
    }

    #[test]
    fn lookups() {
        let table = TuningTable::new();
        assert_eq!(table.frequency_of(128), Err(LookupError::OutOfRange(128)));
        assert_eq!(table.note_number_of("Bb3").unwrap(), 58);
        assert_eq!(table.name_of(61).unwrap(), "C#/Db4");
        assert_eq!(table.temperament().name, "12-edo (standard)");
    }
}
