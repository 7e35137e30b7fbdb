//! Instrument string sets and chromatic octaves. Each pitch of the selected
//! scale gets one wheel, in the listed order.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scale {
    pub name: String,
    pub pitches: Vec<String>,
}

impl Scale {
    fn new(name: impl Into<String>, pitches: &[&str]) -> Self {
        Self {
            name: name.into(),
            pitches: pitches.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn chromatic(octave: u8) -> Self {
        const CLASSES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        Self {
            name: format!("Chromatic {octave}"),
            pitches: CLASSES.iter().map(|c| format!("{c}{octave}")).collect(),
        }
    }
}

/// The ordered scale catalog. Index 0 is the default.
pub fn catalog() -> Vec<Scale> {
    let mut scales = vec![
        Scale::new("Banjo (standard)", &["G4", "D3", "G3", "B3", "D4"]),
        Scale::new("Bass Guitar (standard)", &["E1", "A1", "D2", "G2"]),
        Scale::new("Cello (standard)", &["C2", "G2", "D3", "A3"]),
        Scale::new("Guitar (standard)", &["E2", "A2", "D3", "G3", "B3", "E4"]),
        Scale::new("Mandolin", &["G3", "D4", "A4", "E5"]),
        Scale::new("Ukulele (Concert)", &["G4", "C4", "E4", "A4"]),
        Scale::new("Violin", &["G3", "D4", "A4", "E5"]),
    ];
    scales.extend((1..=6).map(Scale::chromatic));
    scales
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch;

    #[test]
    fn every_scale_pitch_resolves() {
        for scale in catalog() {
            for p in &scale.pitches {
                assert!(pitch::note_number_of(p).is_ok(), "{}: {p}", scale.name);
            }
        }
    }

    #[test]
    fn chromatic_octaves_cover_twelve_classes() {
        let scales = catalog();
        assert_eq!(scales.len(), 13);
        let c4 = &scales[10];
        assert_eq!(c4.name, "Chromatic 4");
        assert_eq!(c4.pitches.len(), 12);
        assert_eq!(c4.pitches[6], "F#4");
    }
}
