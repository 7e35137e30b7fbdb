//! Engine settings with their defaults. Nothing here is read from or written
//! to disk; front-ends build an [`EngineConfig`] from their own inputs.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::pitch::NOTE_COUNT;
use crate::tuning::{DEFAULT_REFERENCE_FREQUENCY, DEFAULT_REFERENCE_PITCH};
use crate::wheel::DEFAULT_HISTORY_DEPTH;
use crate::{scale, temperament};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Index into the temperament catalog.
    #[serde(default)]
    pub temperament: usize,
    /// Index into the scale catalog.
    #[serde(default)]
    pub scale: usize,
    /// MIDI note that sounds at `reference_frequency`.
    #[serde(default = "EngineConfig::default_reference_pitch")]
    pub reference_pitch: usize,
    #[serde(default = "EngineConfig::default_reference_frequency")]
    pub reference_frequency: f32,
    #[serde(default = "EngineConfig::default_autoselect")]
    pub autoselect: bool,
    /// Length of the capture ring.
    #[serde(default = "EngineConfig::default_buffer_seconds")]
    pub buffer_seconds: f32,
    #[serde(default = "EngineConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Polling cycles averaged into each wheel's instability.
    #[serde(default = "EngineConfig::default_history_depth")]
    pub history_depth: usize,
}

impl EngineConfig {
    fn default_reference_pitch() -> usize {
        DEFAULT_REFERENCE_PITCH as usize
    }
    fn default_reference_frequency() -> f32 {
        DEFAULT_REFERENCE_FREQUENCY
    }
    fn default_autoselect() -> bool {
        true
    }
    fn default_buffer_seconds() -> f32 {
        0.2
    }
    fn default_poll_interval_ms() -> u64 {
        50
    }
    fn default_history_depth() -> usize {
        DEFAULT_HISTORY_DEPTH
    }

    /// Checks every field against the catalogs and value ranges.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let temperaments = temperament::catalog().len();
        if self.temperament >= temperaments {
            return Err(ConfigurationError::TemperamentIndex {
                index: self.temperament,
                count: temperaments,
            });
        }
        let scales = scale::catalog().len();
        if self.scale >= scales {
            return Err(ConfigurationError::ScaleIndex {
                index: self.scale,
                count: scales,
            });
        }
        if self.reference_pitch >= NOTE_COUNT {
            return Err(ConfigurationError::ReferencePitch(self.reference_pitch));
        }
        if !(self.reference_frequency.is_finite() && self.reference_frequency > 0.0) {
            return Err(ConfigurationError::ReferenceFrequency(self.reference_frequency));
        }
        if self.history_depth == 0 {
            return Err(ConfigurationError::HistoryDepth);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            temperament: 0,
            scale: 0,
            reference_pitch: Self::default_reference_pitch(),
            reference_frequency: Self::default_reference_frequency(),
            autoselect: Self::default_autoselect(),
            buffer_seconds: Self::default_buffer_seconds(),
            poll_interval_ms: Self::default_poll_interval_ms(),
            history_depth: Self::default_history_depth(),
        }
    }
}
