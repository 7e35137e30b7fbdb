//! # Strobe Wheels
//!
//! A wheel is a circular buffer holding one period of its target frequency.
//! Incoming audio is folded onto it with a phase accumulator: every input
//! sample lands on the current segment, and the segment index advances by
//! `sample_count / period` per sample. A signal at exactly the target
//! frequency keeps landing on the same segments, so the folded waveform
//! stands still; a mistuned one drifts around the wheel.
//!
//! After each block the wheel is averaged, normalised and scored. The score
//! (`instability`) measures how much the wheel's sign pattern changed over the
//! last few polling cycles.

use serde::Serialize;

use crate::error::ConfigurationError;
use crate::pitch;
use crate::scale::Scale;
use crate::tuning::TuningTable;

/// Below this peak level a folded wheel is treated as silence and left unscaled.
pub const NOISE_FLOOR: f32 = 0.0001;
/// Targets below this frequency get a minimal two-segment wheel.
pub const MIN_WHEEL_FREQUENCY: f32 = 20.0;
/// Number of polling cycles averaged into the instability score.
pub const DEFAULT_HISTORY_DEPTH: usize = 6;

/// Folding state for a single target pitch.
#[derive(Debug, Clone)]
pub struct Wheel {
    label: String,
    frequency: f32,
    samples: Vec<f32>,
    add_counts: Vec<u32>,
    position: usize,
    // accumulated phase between the true wheel position and `position`
    error: f64,
    step: f64,
    unders: usize,
    overs: usize,
    diffs: Vec<usize>,
    diff_index: usize,
    instability: f32,
    pub(crate) max_amplitude: f32,
    pub(crate) zero_crossings: usize,
    pub(crate) selected: bool,
}

impl Wheel {
    /// Sizes a wheel so one revolution spans one period at `sample_rate`.
    /// `history_depth` must be at least 1.
    pub fn new(label: impl Into<String>, frequency: f32, sample_rate: u32, history_depth: usize) -> Self {
        let (sample_count, step) = if frequency >= MIN_WHEEL_FREQUENCY {
            let period = sample_rate as f64 / frequency as f64;
            let count = (period as usize).saturating_sub(1).max(2);
            (count, count as f64 / period)
        } else {
            (2, 1.0)
        };

        Self {
            label: label.into(),
            frequency,
            samples: vec![0.0; sample_count],
            add_counts: vec![0; sample_count],
            position: 0,
            error: 0.0,
            step,
            unders: 0,
            overs: 0,
            diffs: vec![0; history_depth.max(1)],
            diff_index: 0,
            instability: 0.0,
            max_amplitude: 0.0,
            zero_crossings: 0,
            selected: true,
        }
    }

    /// Zeroes the folded buffer and counts. The position and phase carry over.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.add_counts.fill(0);
    }

    /// Accumulates a block of input samples onto the wheel.
    pub fn fold(&mut self, block: &[f32]) {
        let segments = self.samples.len();
        for &x in block {
            self.samples[self.position] += x;
            self.add_counts[self.position] += 1;

            self.error += self.step;
            if self.error >= 1.0 {
                let advance = self.error.floor();
                self.position = (self.position + advance as usize) % segments;
                self.error -= advance;
            }
        }
    }

    /// Averages, normalises and scores what was folded since the last clear.
    pub fn finish(&mut self) {
        let mut max_amplitude: f32 = 0.0;
        for (sample, &count) in self.samples.iter_mut().zip(&self.add_counts) {
            if count > 0 {
                *sample /= count as f32;
            }
            max_amplitude = max_amplitude.max(sample.abs());
        }

        // compensate for low levels unless this is basically silence
        if max_amplitude > NOISE_FLOOR {
            let amplify = 1.0 / max_amplitude;
            for sample in &mut self.samples {
                *sample *= amplify;
            }
        }
        self.max_amplitude = max_amplitude;
        self.update_stats();
    }

    fn update_stats(&mut self) {
        let (mut unders, mut overs, mut crossings) = (0, 0, 0);
        let mut last = self.samples[self.samples.len() - 1];
        for &sample in &self.samples {
            if sample < 0.0 {
                if last >= 0.0 {
                    crossings += 1;
                }
                unders += 1;
            } else {
                if last < 0.0 {
                    crossings += 1;
                }
                overs += 1;
            }
            last = sample;
        }

        let diff = self.unders.abs_diff(unders) + self.overs.abs_diff(overs);
        self.unders = unders;
        self.overs = overs;
        self.zero_crossings = crossings;

        self.diffs[self.diff_index] = diff;
        self.diff_index = (self.diff_index + 1) % self.diffs.len();
        let total: usize = self.diffs.iter().sum();
        self.instability = total as f32 / (self.diffs.len() * self.samples.len()) as f32;
    }

    /// Pitch name shown next to the wheel, such as `A4`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Target frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// The folded waveform, normalised to a peak of 1.0 unless silent.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of segments in one revolution.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Wheel segments advanced per input sample.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// 0.0 for a wheel whose sign pattern has not changed over the history;
    /// higher values mean more drift.
    pub fn instability(&self) -> f32 {
        self.instability
    }

    /// Peak level of the averaged waveform before normalisation.
    pub fn max_amplitude(&self) -> f32 {
        self.max_amplitude
    }

    /// Sign changes around the folded waveform, counting the wrap from the
    /// last segment to the first. A clean fold of a sine has two.
    pub fn zero_crossings(&self) -> usize {
        self.zero_crossings
    }

    /// Whether the selector kept this wheel on the last cycle.
    ///
    /// # Returns
    /// Always `true` with autoselect off.
    pub fn selected(&self) -> bool {
        self.selected
    }
}

/// One wheel per pitch of the active scale.
#[derive(Debug, Clone)]
pub struct WheelSet {
    wheels: Vec<Wheel>,
    sample_rate: u32,
}

/// A target used to build a [`WheelSet`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelTarget {
    pub label: String,
    pub frequency: f32,
}

impl WheelSet {
    pub fn new(targets: &[WheelTarget], sample_rate: u32, history_depth: usize) -> Self {
        let wheels = targets
            .iter()
            .map(|t| Wheel::new(t.label.clone(), t.frequency, sample_rate, history_depth))
            .collect();
        Self { wheels, sample_rate }
    }

    /// Builds wheels for every pitch of `scale` at the frequencies of `tuning`.
    pub fn for_scale(
        scale: &Scale,
        tuning: &TuningTable,
        sample_rate: u32,
        history_depth: usize,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(&targets(scale, tuning)?, sample_rate, history_depth))
    }

    /// Runs one polling cycle: clear, fold the whole block, then score.
    pub fn process(&mut self, block: &[f32]) {
        for wheel in &mut self.wheels {
            wheel.clear();
            wheel.fold(block);
            wheel.finish();
        }
    }

    pub fn wheels(&self) -> &[Wheel] {
        &self.wheels
    }

    pub fn wheels_mut(&mut self) -> &mut [Wheel] {
        &mut self.wheels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }
}

/// Resolves each pitch of `scale` to its frequency under `tuning`.
pub fn targets(scale: &Scale, tuning: &TuningTable) -> Result<Vec<WheelTarget>, ConfigurationError> {
    scale
        .pitches
        .iter()
        .map(|name| {
            let note = pitch::note_number_of(name).map_err(|_| ConfigurationError::UnknownScalePitch {
                scale: scale.name.clone(),
                pitch: name.clone(),
            })?;
            Ok(WheelTarget {
                label: name.clone(),
                frequency: tuning.frequencies()[note as usize],
            })
        })
        .collect()
}
