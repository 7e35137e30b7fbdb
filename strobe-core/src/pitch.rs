//! # Pitch Names
//!
//! Bidirectional mapping between note names and MIDI note numbers 0-127.
//!
//! Every note has a primary display name. Naturals are spelled plainly (`A4`),
//! accidentals carry both spellings (`C#/Db4`). Lookups accept the display
//! name as well as the plain sharp (`C#4`) or flat (`Db4`) spelling.
//! Octaves follow the convention where middle C (MIDI 60) is `C4`, which puts
//! MIDI 0 at `C-1` and MIDI 127 at `G9`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::LookupError;

/// Number of MIDI notes covered by the tables.
pub const NOTE_COUNT: usize = 128;

const SHARPS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLATS: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

struct PitchTable {
    /// Primary name per MIDI note.
    names: Vec<String>,
    /// Every accepted spelling mapped to its MIDI note.
    numbers: HashMap<String, u8>,
}

/// Built once on first use and never modified afterwards.
static PITCHES: Lazy<PitchTable> = Lazy::new(|| {
    let mut names = Vec::with_capacity(NOTE_COUNT);
    let mut numbers = HashMap::with_capacity(NOTE_COUNT * 3);

    for note in 0..NOTE_COUNT {
        let class = note % 12;
        let octave = (note / 12) as i32 - 1;
        let (sharp, flat) = (SHARPS[class], FLATS[class]);

        if sharp == flat {
            let name = format!("{sharp}{octave}");
            numbers.insert(name.clone(), note as u8);
            names.push(name);
        } else {
            let name = format!("{sharp}/{flat}{octave}");
            numbers.insert(name.clone(), note as u8);
            numbers.insert(format!("{sharp}{octave}"), note as u8);
            numbers.insert(format!("{flat}{octave}"), note as u8);
            names.push(name);
        }
    }

    PitchTable { names, numbers }
});

/// Returns the primary display name of a MIDI note.
pub fn name_of(note: usize) -> Result<&'static str, LookupError> {
    PITCHES
        .names
        .get(note)
        .map(String::as_str)
        .ok_or(LookupError::OutOfRange(note))
}

/// Resolves any accepted spelling of a pitch name to its MIDI note.
pub fn note_number_of(name: &str) -> Result<u8, LookupError> {
    PITCHES
        .numbers
        .get(name.trim())
        .copied()
        .ok_or_else(|| LookupError::UnknownPitchName(name.to_string()))
}

/// All primary names in MIDI order, indexed by MIDI note.
pub fn pitch_names() -> &'static [String] {
    &PITCHES.names
}
