//! # Error Types
//!
//! Configuration problems are rejected synchronously before any state is
//! touched. Device problems only surface while connecting; once capture is
//! running nothing in the engine fails, it only saturates.

use thiserror::Error;

/// An invalid configuration value. The rejected change is never applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("temperament index {index} is out of range (catalog has {count})")]
    TemperamentIndex { index: usize, count: usize },

    #[error("scale index {index} is out of range (catalog has {count})")]
    ScaleIndex { index: usize, count: usize },

    #[error("reference pitch {0} is not a MIDI note (0-127)")]
    ReferencePitch(usize),

    #[error("reference frequency must be a positive number of Hz, got {0}")]
    ReferenceFrequency(f32),

    #[error("stability history depth must be at least 1")]
    HistoryDepth,

    #[error("scale '{scale}' names an unknown pitch '{pitch}'")]
    UnknownScalePitch { scale: String, pitch: String },
}

/// A failure to acquire the audio input. Carries a human-readable cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("audio server unreachable: {0}")]
    ServerUnreachable(String),

    #[error("failed to register the capture port: {0}")]
    PortRegistration(String),

    #[error("failed to allocate the capture buffer: {0}")]
    BufferAllocation(String),

    #[error("failed to activate audio capture: {0}")]
    Activation(String),
}

/// A lookup into the tuning or pitch-name tables that has no answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("MIDI note {0} is out of range (0-127)")]
    OutOfRange(usize),

    #[error("unknown pitch name '{0}'")]
    UnknownPitchName(String),
}
