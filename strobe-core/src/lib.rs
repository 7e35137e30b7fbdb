// strobe-core/src/lib.rs

//! The core logic for the strobe tuner.
//! This crate owns the tuning tables, the real-time capture ring and the
//! wheel-folding engine that replaces pitch detection. It is completely
//! headless and contains no rendering code.

pub mod audio;
pub mod capture;
pub mod config;
pub mod engine;
pub mod error;
pub mod pitch;
pub mod scale;
pub mod select;
pub mod temperament;
pub mod tuning;
pub mod view;
pub mod wheel;

pub use config::EngineConfig;
pub use engine::StrobeEngine;
pub use error::{ConfigurationError, DeviceError, LookupError};
pub use view::{Snapshot, WheelView};
