//! Read-only snapshots of the engine for front-ends.
//!
//! Renderers get each wheel's folded waveform plus an `intensity` in
//! `[0.05, 1.0]` derived from its instability. Both types serialize with
//! `serde`, which the command-line front-end uses for its JSON output.

use serde::Serialize;

use crate::tuning::TuningState;
use crate::wheel::Wheel;

/// Instability at or below which a wheel is drawn at full intensity.
pub const STABLE_INSTABILITY: f32 = 0.05;
/// Instability range over which intensity fades down to [`MIN_INTENSITY`].
pub const FADE_RANGE: f32 = 0.10;
pub const MIN_INTENSITY: f32 = 0.05;
/// Extra dimming for wheels that lost autoselection.
pub const DESELECTED_DIM: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelView {
    pub label: String,
    pub frequency: f32,
    pub instability: f32,
    pub selected: bool,
    pub max_amplitude: f32,
    pub intensity: f32,
    pub samples: Vec<f32>,
}

impl WheelView {
    pub fn new(wheel: &Wheel, autoselect: bool) -> Self {
        Self {
            label: wheel.label().to_string(),
            frequency: wheel.frequency(),
            instability: wheel.instability(),
            selected: wheel.selected(),
            max_amplitude: wheel.max_amplitude(),
            intensity: intensity(wheel.instability(), wheel.selected(), autoselect),
            samples: wheel.samples().to_vec(),
        }
    }
}

/// The reference pitch as both MIDI number and display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceView {
    pub note: u8,
    pub name: String,
    pub frequency: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub temperament: String,
    pub scale: String,
    pub reference: ReferenceView,
    pub autoselect: bool,
    pub sample_rate: u32,
    pub wheels: Vec<WheelView>,
}

impl ReferenceView {
    pub(crate) fn new(state: &TuningState, name: &str) -> Self {
        Self {
            note: state.reference_pitch,
            name: name.to_string(),
            frequency: state.reference_frequency,
        }
    }
}

/// Maps a wheel's instability to a drawing intensity.
///
/// # Arguments
/// * `instability` - The wheel's instability score
/// * `selected` - Whether the selector kept the wheel
/// * `autoselect` - Whether autoselection is active
///
/// # Returns
/// 1.0 for stable wheels, fading linearly to 0.05 at an instability of 0.15.
pub fn intensity(instability: f32, selected: bool, autoselect: bool) -> f32 {
    let mut alpha = if instability <= STABLE_INSTABILITY {
        1.0
    } else {
        (1.0 - (instability - STABLE_INSTABILITY) / FADE_RANGE).max(MIN_INTENSITY)
    };
    if autoselect && !selected {
        alpha *= DESELECTED_DIM;
    }
    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stable_wheels_are_fully_lit() {
        assert_eq!(intensity(0.0, true, true), 1.0);
        assert_eq!(intensity(0.05, true, true), 1.0);
    }

    #[test]
    fn fades_linearly_then_floors() {
        assert_relative_eq!(intensity(0.10, true, true), 0.5, max_relative = 1e-5);
        assert_relative_eq!(intensity(0.15, true, true), 0.05, max_relative = 1e-5);
        assert_eq!(intensity(0.9, true, true), MIN_INTENSITY);
    }

    #[test]
    fn deselected_wheels_dim_only_under_autoselect() {
        assert_relative_eq!(intensity(0.0, false, true), 0.05);
        assert_eq!(intensity(0.0, false, false), 1.0);
    }

    #[test]
    fn view_copies_wheel_state() {
        let wheel = Wheel::new("A4", 440.0, 44_100, 6);
        let view = WheelView::new(&wheel, true);
        assert_eq!(view.label, "A4");
        assert_eq!(view.samples.len(), 99);
        assert!(view.selected);
        assert_eq!(view.intensity, 1.0);
    }
}
