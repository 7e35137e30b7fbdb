//! # Audio Capture Module
//!
//! Connects the default input device through CPAL (Cross-Platform Audio
//! Library) and feeds its callback into a [`CaptureBuffer`].
//!
//! ## Features
//! - Automatic audio device selection
//! - Prefers mono 32-bit float input near 44.1 kHz
//! - Falls back to the device's default f32 format, keeping the first channel
//! - Stream errors are forwarded to the polling thread over a channel;
//!   [`is_fatal`] tells a lost device apart from a recoverable hiccup
//!
//! Every failure while connecting is reported as a [`DeviceError`]; the caller
//! stays disconnected and can simply try again.

use cpal::{StreamError, SupportedStreamConfigRange};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;

use crate::capture::{CaptureBuffer, CaptureReader, WallClock};
use crate::error::DeviceError;

/// Sample rate requested from the device when it offers a choice.
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Stream errors kept for the consumer; older ones are dropped when full.
const ERROR_BACKLOG: usize = 16;

/// A running input stream. Dropping it stops capture.
pub struct AudioInput {
    stream: cpal::Stream,
    device_name: String,
    sample_rate: u32,
    errors: Receiver<StreamError>,
}

impl AudioInput {
    /// Name reported by the backend for the opened device.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Rate the stream actually runs at, which sizes the wheels.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Errors reported by the audio backend after the stream started.
    /// Pass each one to [`is_fatal`] to decide whether capture is still alive.
    pub fn errors(&self) -> &Receiver<StreamError> {
        &self.errors
    }

    /// Stops the stream ahead of dropping it.
    pub fn pause(&self) -> Result<(), DeviceError> {
        self.stream
            .pause()
            .map_err(|e| DeviceError::Activation(e.to_string()))
    }
}

/// Starts audio capture from the default input device.
///
/// This function:
/// 1. Selects the default input device and a float input format
/// 2. Allocates a capture ring of `buffer_seconds` at the device rate
/// 3. Builds and starts a stream whose callback writes into the ring
///
/// # Returns
/// * `Ok((input, reader))` - Stream handle and the consumer half of the ring
/// * `Err(e)` - The step that failed, with the backend's explanation
pub fn connect_input(buffer_seconds: f32) -> Result<(AudioInput, CaptureReader), DeviceError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or_else(|| {
        DeviceError::ServerUnreachable(format!(
            "no input device available on the {} host",
            host.id().name()
        ))
    })?;
    let device_name = device.name().unwrap_or_else(|_| "unknown device".to_string());
    log::info!("[AUDIO] Using audio input device: {device_name}");

    let configs = device
        .supported_input_configs()
        .map_err(|e| DeviceError::PortRegistration(e.to_string()))?
        .collect::<Vec<_>>();
    let supported = match find_supported_config(configs, TARGET_SAMPLE_RATE) {
        Some(range) => {
            let rate = TARGET_SAMPLE_RATE.clamp(range.min_sample_rate().0, range.max_sample_rate().0);
            range.with_sample_rate(cpal::SampleRate(rate))
        }
        None => {
            let default = device
                .default_input_config()
                .map_err(|e| DeviceError::PortRegistration(e.to_string()))?;
            if default.sample_format() != cpal::SampleFormat::F32 {
                return Err(DeviceError::PortRegistration(format!(
                    "no 32-bit float input format (device default is {})",
                    default.sample_format()
                )));
            }
            default
        }
    };

    let channels = supported.channels() as usize;
    let config: cpal::StreamConfig = supported.into();
    let sample_rate = config.sample_rate.0;
    log::info!("[AUDIO] Selected {sample_rate} Hz, {channels} channel(s)");

    let (mut writer, reader) =
        CaptureBuffer::new(buffer_seconds, sample_rate)?.split(WallClock::new(sample_rate));

    let (error_tx, error_rx) = crossbeam_channel::bounded(ERROR_BACKLOG);
    let err_fn = move |err: StreamError| {
        // Dropped if the consumer is not keeping up.
        let _ = error_tx.try_send(err);
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                writer.write_channel(data, channels);
            },
            err_fn,
            None,
        )
        .map_err(|e| DeviceError::PortRegistration(e.to_string()))?;

    stream
        .play()
        .map_err(|e| DeviceError::Activation(e.to_string()))?;

    Ok((
        AudioInput {
            stream,
            device_name,
            sample_rate,
            errors: error_rx,
        },
        reader,
    ))
}

/// Whether a stream error means the device is gone.
///
/// Backend-specific errors (an xrun the backend failed to recover from in
/// one go, a poll failure) leave the stream running, so capture carries on.
///
/// # Returns
/// * `true` - The stream will deliver no more audio; disconnect
/// * `false` - Log it and keep polling
pub fn is_fatal(err: &StreamError) -> bool {
    matches!(err, StreamError::DeviceNotAvailable)
}

/// Picks the float configuration with the fewest channels, then the one whose
/// sample-rate range comes closest to `target_rate`.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let (min, max) = (c.min_sample_rate().0, c.max_sample_rate().0);
            let distance = if target_rate < min {
                min - target_rate
            } else {
                target_rate.saturating_sub(max)
            };
            (c.channels(), distance)
        })
}
