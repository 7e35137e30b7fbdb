//! # Wheel Selection
//!
//! Decides which wheel(s) match the fundamental of the input.
//!
//! A wheel tuned to the fundamental folds the signal into a clean shape with
//! few zero crossings. Wheels at related but mismatched frequencies see the
//! signal smeared across their revolution, which either lowers their averaged
//! amplitude or leaves more sign changes behind.

use crate::wheel::Wheel;

/// Wheels below this share of the loudest wheel cannot be the dominant pitch.
pub const AMPLITUDE_CUTOFF: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelSelector {
    pub autoselect: bool,
}

impl Default for WheelSelector {
    fn default() -> Self {
        Self { autoselect: true }
    }
}

impl WheelSelector {
    pub fn new(autoselect: bool) -> Self {
        Self { autoselect }
    }

    /// Marks each wheel selected or not from the current cycle's stats.
    pub fn select(&self, wheels: &mut [Wheel]) {
        let mut max_amplitude: f32 = 0.0;
        for wheel in wheels.iter_mut() {
            wheel.selected = true;
            max_amplitude = max_amplitude.max(wheel.max_amplitude);
        }
        if !self.autoselect {
            return;
        }

        let cutoff = max_amplitude * AMPLITUDE_CUTOFF;
        let mut min_crossings = usize::MAX;
        for wheel in wheels.iter_mut() {
            if wheel.max_amplitude < cutoff {
                wheel.selected = false;
            } else {
                min_crossings = min_crossings.min(wheel.zero_crossings);
            }
        }
        for wheel in wheels.iter_mut() {
            if wheel.zero_crossings > min_crossings {
                wheel.selected = false;
            }
        }
    }
}
