//! # Strobe Engine
//!
//! Ties the tuning table, the wheels and the selector to a capture reader.
//! The engine lives on the polling thread; the audio callback only ever sees
//! the writer half of the capture ring.
//!
//! ## Polling cycle
//! 1. Drain the frames that arrived since the last poll
//! 2. Clear, fold and score every wheel
//! 3. Mark the wheels that best match the input
//!
//! Every setter validates before touching anything, so a rejected change
//! leaves the engine exactly as it was.

use crate::capture::CaptureReader;
use crate::config::EngineConfig;
use crate::error::ConfigurationError;
use crate::scale::{self, Scale};
use crate::select::WheelSelector;
use crate::tuning::TuningTable;
use crate::view::{ReferenceView, Snapshot, WheelView};
use crate::wheel::{Wheel, WheelSet};

/// Sample rate the wheels are sized for while no input is connected.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

pub struct StrobeEngine {
    tuning: TuningTable,
    scales: Vec<Scale>,
    scale_index: usize,
    wheels: WheelSet,
    selector: WheelSelector,
    reader: Option<CaptureReader>,
    history_depth: usize,
}

impl StrobeEngine {
    /// Builds a disconnected engine with wheels sized for [`DEFAULT_SAMPLE_RATE`].
    ///
    /// # Arguments
    /// * `config` - Initial tuning, scale and stability settings
    ///
    /// # Returns
    /// * `Ok(engine)` - Ready for [`StrobeEngine::connect`]
    /// * `Err(e)` - The first invalid field of `config`
    pub fn new(config: EngineConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let mut tuning = TuningTable::new();
        tuning.configure(config.temperament, config.reference_pitch, config.reference_frequency)?;
        let scales = scale::catalog();
        let wheels = WheelSet::for_scale(
            &scales[config.scale],
            &tuning,
            DEFAULT_SAMPLE_RATE,
            config.history_depth,
        )?;
        log::info!(
            "[ENGINE] {} / {} with {} wheel(s)",
            tuning.temperament().name,
            scales[config.scale].name,
            wheels.len()
        );
        Ok(Self {
            tuning,
            scales,
            scale_index: config.scale,
            wheels,
            selector: WheelSelector::new(config.autoselect),
            reader: None,
            history_depth: config.history_depth,
        })
    }

    /// Switches to another temperament and retargets the wheels.
    ///
    /// # Arguments
    /// * `index` - Position in the temperament catalog
    ///
    /// # Returns
    /// * `Ok(true)` - Table and wheels were rebuilt
    /// * `Ok(false)` - `index` was already active; nothing changed
    /// * `Err(e)` - `index` is out of range; nothing changed
    pub fn select_temperament(&mut self, index: usize) -> Result<bool, ConfigurationError> {
        self.retune(|tuning| tuning.set_temperament(index))
    }

    /// Moves the reference to another MIDI note (0-127), keeping its frequency.
    ///
    /// # Returns
    /// Same as [`StrobeEngine::select_temperament`].
    pub fn set_reference_pitch(&mut self, pitch: usize) -> Result<bool, ConfigurationError> {
        self.retune(|tuning| tuning.set_reference_pitch(pitch))
    }

    /// Sets the frequency of the reference pitch. `hz` must be finite and positive.
    ///
    /// # Returns
    /// Same as [`StrobeEngine::select_temperament`].
    pub fn set_reference_frequency(&mut self, hz: f32) -> Result<bool, ConfigurationError> {
        self.retune(|tuning| tuning.set_reference_frequency(hz))
    }

    /// Switches to another scale from the catalog and rebuilds the wheels.
    ///
    /// # Arguments
    /// * `index` - Position in the scale catalog
    ///
    /// # Returns
    /// Whether the wheels were rebuilt, or the rejected index.
    pub fn select_scale(&mut self, index: usize) -> Result<bool, ConfigurationError> {
        let scale = self.scales.get(index).ok_or(ConfigurationError::ScaleIndex {
            index,
            count: self.scales.len(),
        })?;
        if index == self.scale_index {
            return Ok(false);
        }
        self.wheels = WheelSet::for_scale(scale, &self.tuning, self.sample_rate(), self.history_depth)?;
        self.scale_index = index;
        log::info!("[ENGINE] Scale set to {} ({} wheels)", scale.name, self.wheels.len());
        Ok(true)
    }

    /// Turns highlighting of the best-matching wheels on or off. Takes
    /// effect on the next polling cycle.
    pub fn set_autoselect(&mut self, autoselect: bool) {
        self.selector.autoselect = autoselect;
    }

    // Applies a tuning change to a copy so the wheels and the table are
    // replaced together or not at all.
    fn retune(
        &mut self,
        change: impl FnOnce(&mut TuningTable) -> Result<bool, ConfigurationError>,
    ) -> Result<bool, ConfigurationError> {
        let mut tuning = self.tuning.clone();
        if !change(&mut tuning)? {
            return Ok(false);
        }
        self.wheels = WheelSet::for_scale(
            &self.scales[self.scale_index],
            &tuning,
            self.sample_rate(),
            self.history_depth,
        )?;
        self.tuning = tuning;
        Ok(true)
    }

    /// Attaches a capture reader. Wheels are resized when its sample rate
    /// differs from the one they were built for.
    pub fn connect(&mut self, reader: CaptureReader) {
        let rate = reader.sample_rate();
        if rate != self.wheels.sample_rate() {
            self.resize_wheels(rate);
        }
        log::info!(
            "[ENGINE] Connected at {rate} Hz, {} frame ring",
            reader.capacity_frames()
        );
        self.reader = Some(reader);
    }

    /// Drops the reader. Wheels keep their last state until reconnection.
    pub fn disconnect(&mut self) -> Option<CaptureReader> {
        let reader = self.reader.take();
        if reader.is_some() {
            log::info!("[ENGINE] Disconnected");
        }
        reader
    }

    /// Whether a capture reader is attached.
    pub fn is_connected(&self) -> bool {
        self.reader.is_some()
    }

    fn resize_wheels(&mut self, sample_rate: u32) {
        let scale = &self.scales[self.scale_index];
        // the active scale was already resolved once, so this cannot fail
        match WheelSet::for_scale(scale, &self.tuning, sample_rate, self.history_depth) {
            Ok(wheels) => self.wheels = wheels,
            Err(e) => log::error!("[ENGINE] Could not resize wheels: {e}"),
        }
    }

    /// Runs one polling cycle. Returns `false` without touching the wheels
    /// while disconnected.
    pub fn poll(&mut self) -> bool {
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        let block = reader.read(reader.capacity_frames());
        self.process_block(&block);
        true
    }

    /// Folds `block` into every wheel and updates the selection.
    pub fn process_block(&mut self, block: &[f32]) {
        self.wheels.process(block);
        self.selector.select(self.wheels.wheels_mut());
    }

    /// The wheels of the active scale, in scale order.
    pub fn wheels(&self) -> &[Wheel] {
        self.wheels.wheels()
    }

    /// Current frequencies and the state they were computed from.
    pub fn tuning(&self) -> &TuningTable {
        &self.tuning
    }

    /// The full scale catalog.
    pub fn scales(&self) -> &[Scale] {
        &self.scales
    }

    /// The active scale.
    pub fn scale(&self) -> &Scale {
        &self.scales[self.scale_index]
    }

    pub fn scale_index(&self) -> usize {
        self.scale_index
    }

    /// Whether the selector narrows the lit wheels to the best match.
    pub fn autoselect(&self) -> bool {
        self.selector.autoselect
    }

    pub fn history_depth(&self) -> usize {
        self.history_depth
    }

    /// The rate the wheels are currently sized for.
    pub fn sample_rate(&self) -> u32 {
        self.wheels.sample_rate()
    }

    /// Copies everything a renderer needs out of the engine.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.tuning.state();
        let reference_name = self
            .tuning
            .name_of(state.reference_pitch as usize)
            .unwrap_or_default();
        Snapshot {
            temperament: self.tuning.temperament().name.to_string(),
            scale: self.scale().name.clone(),
            reference: ReferenceView::new(&state, reference_name),
            autoselect: self.autoselect(),
            sample_rate: self.sample_rate(),
            wheels: self
                .wheels()
                .iter()
                .map(|w| WheelView::new(w, self.autoselect()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CaptureBuffer, ManualClock};

    fn engine() -> StrobeEngine {
        StrobeEngine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn starts_with_the_default_scale() {
        let engine = engine();
        assert_eq!(engine.wheels().len(), 5);
        assert_eq!(engine.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert!(!engine.is_connected());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EngineConfig {
            scale: 99,
            ..Default::default()
        };
        assert!(matches!(
            StrobeEngine::new(config),
            Err(ConfigurationError::ScaleIndex { index: 99, .. })
        ));
    }

    #[test]
    fn scale_change_rebuilds_wheels() {
        let mut engine = engine();
        assert!(engine.select_scale(6).unwrap());
        let labels: Vec<&str> = engine.wheels().iter().map(Wheel::label).collect();
        assert_eq!(labels, ["G3", "D4", "A4", "E5"]);
        assert!(!engine.select_scale(6).unwrap());
    }

    #[test]
    fn rejected_changes_leave_everything_alone() {
        let mut engine = engine();
        engine.select_scale(6).unwrap();
        let before: Vec<f32> = engine.wheels().iter().map(Wheel::frequency).collect();

        assert!(engine.select_scale(13).is_err());
        assert!(engine.select_temperament(24).is_err());
        assert!(engine.set_reference_pitch(128).is_err());
        assert!(engine.set_reference_frequency(0.0).is_err());
        assert!(engine.set_reference_frequency(f32::NAN).is_err());

        let after: Vec<f32> = engine.wheels().iter().map(Wheel::frequency).collect();
        assert_eq!(before, after);
        assert_eq!(engine.scale_index(), 6);
        assert_eq!(engine.tuning().state().reference_frequency, 440.0);
    }

    #[test]
    fn reference_change_retargets_wheels() {
        let mut engine = engine();
        engine.select_scale(6).unwrap();
        assert!(engine.set_reference_frequency(442.0).unwrap());
        assert_eq!(engine.wheels()[2].frequency(), 442.0);
        assert!(!engine.set_reference_frequency(442.0).unwrap());
    }

    #[test]
    fn disconnected_poll_does_nothing() {
        let mut engine = engine();
        assert!(!engine.poll());
        assert!(engine.wheels().iter().all(|w| w.max_amplitude() == 0.0));
    }

    #[test]
    fn connecting_at_another_rate_resizes_wheels() {
        let mut engine = engine();
        engine.select_scale(6).unwrap();
        let (_writer, reader) = CaptureBuffer::new(0.2, 48_000)
            .unwrap()
            .split(ManualClock::new());
        engine.connect(reader);
        assert!(engine.is_connected());
        assert_eq!(engine.sample_rate(), 48_000);
        // A4 at 48 kHz: floor(109.09) - 1
        assert_eq!(engine.wheels()[2].sample_count(), 108);

        assert!(engine.disconnect().is_some());
        assert!(!engine.is_connected());
        assert!(engine.disconnect().is_none());
    }

    #[test]
    fn snapshot_describes_the_setup() {
        let mut engine = engine();
        engine.select_scale(6).unwrap();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.scale, "Violin");
        assert_eq!(snapshot.reference.name, "A4");
        assert_eq!(snapshot.reference.note, 69);
        assert_eq!(snapshot.wheels.len(), 4);
        assert!(snapshot.autoselect);
    }
}
