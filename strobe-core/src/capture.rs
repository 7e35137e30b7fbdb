//! # Capture Buffer
//!
//! A single-producer/single-consumer ring between the audio device callback
//! and the polling consumer.
//!
//! ## Contract
//! - The producer ([`CaptureWriter`]) never blocks, locks or allocates.
//!   When the ring is full the oldest unread frames are overwritten.
//! - The consumer ([`CaptureReader`]) is paced by a [`SampleClock`]: each read
//!   takes the number of frames that elapsed since the previous read, but never
//!   more than half of what is buffered, so the next read always has data.
//! - Cursors count bytes and only ever grow. A write cursor that is not on a
//!   frame boundary is moved back to the previous boundary before writing.
//!
//! Samples are stored as `f32` bit patterns in atomics, so a producer
//! overwriting a region the consumer is copying yields stale audio rather
//! than a data race. The consumer detects that case and copies again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use crate::error::DeviceError;

/// Bytes per captured frame: one mono 32-bit float.
pub const FRAME_BYTES: u64 = std::mem::size_of::<f32>() as u64;

/// A source of "now" measured in sample frames.
pub trait SampleClock: Send {
    fn now_frames(&self) -> u64;
}

/// Monotonic wall time converted to frames at a fixed sample rate.
#[derive(Debug, Clone)]
pub struct WallClock {
    origin: Instant,
    sample_rate: u32,
}

impl WallClock {
    /// Starts counting from zero now.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            origin: Instant::now(),
            sample_rate,
        }
    }
}

impl SampleClock for WallClock {
    fn now_frames(&self) -> u64 {
        (self.origin.elapsed().as_secs_f64() * self.sample_rate as f64) as u64
    }
}

/// A clock advanced by hand, for feeding recorded or synthetic audio.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    /// A clock stopped at frame zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves every clone of this clock forward by `frames`.
    pub fn advance(&self, frames: u64) {
        self.0.fetch_add(frames, Ordering::Relaxed);
    }
}

impl SampleClock for ManualClock {
    fn now_frames(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

struct Ring {
    slots: Box<[AtomicU32]>,
    write_cursor: AtomicU64,
    read_cursor: AtomicU64,
}

impl Ring {
    fn capacity_frames(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, cursor: u64) -> &AtomicU32 {
        let index = (cursor / FRAME_BYTES) % self.slots.len() as u64;
        &self.slots[index as usize]
    }

    fn available_frames(&self) -> usize {
        let read = self.read_cursor.load(Ordering::Acquire);
        let write = self.write_cursor.load(Ordering::Acquire);
        (write.saturating_sub(read) / FRAME_BYTES) as usize
    }

    /// Moves the read cursor past anything the writer is about to overwrite.
    fn reclaim(&self, write_end: u64) {
        let capacity_bytes = self.slots.len() as u64 * FRAME_BYTES;
        let floor = write_end.saturating_sub(capacity_bytes);
        let mut read = self.read_cursor.load(Ordering::Acquire);
        while read < floor {
            match self.read_cursor.compare_exchange_weak(
                read,
                floor,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => read = actual,
            }
        }
    }
}

/// The ring before it is split into its producer and consumer halves.
pub struct CaptureBuffer {
    ring: Arc<Ring>,
    sample_rate: u32,
}

impl CaptureBuffer {
    /// Allocates a ring holding `ceil(buffer_seconds * sample_rate)` frames.
    pub fn new(buffer_seconds: f32, sample_rate: u32) -> Result<Self, DeviceError> {
        let frames = (buffer_seconds * sample_rate as f32).ceil();
        if !frames.is_finite() || frames < 1.0 {
            return Err(DeviceError::BufferAllocation(format!(
                "{buffer_seconds} s at {sample_rate} Hz is not a usable buffer length"
            )));
        }
        let frames = frames as usize;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(frames)
            .map_err(|e| DeviceError::BufferAllocation(format!("{frames} frames: {e}")))?;
        slots.extend((0..frames).map(|_| AtomicU32::new(0)));

        log::debug!("[CAPTURE] Allocated {frames} frames at {sample_rate} Hz");
        Ok(Self {
            ring: Arc::new(Ring {
                slots: slots.into_boxed_slice(),
                write_cursor: AtomicU64::new(0),
                read_cursor: AtomicU64::new(0),
            }),
            sample_rate,
        })
    }

    /// Frames the ring holds before the oldest are overwritten.
    pub fn capacity_frames(&self) -> usize {
        self.ring.capacity_frames()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Splits into the producer half (for the audio callback) and the consumer
    /// half (for the polling thread). The consumer's clock starts now.
    pub fn split(self, clock: impl SampleClock + 'static) -> (CaptureWriter, CaptureReader) {
        let last_read = clock.now_frames();
        let writer = CaptureWriter {
            ring: Arc::clone(&self.ring),
        };
        let reader = CaptureReader {
            ring: self.ring,
            clock: Box::new(clock),
            last_read,
            sample_rate: self.sample_rate,
        };
        (writer, reader)
    }
}

/// Producer half. Safe to call from a real-time audio callback.
pub struct CaptureWriter {
    ring: Arc<Ring>,
}

impl CaptureWriter {
    /// Appends mono frames.
    pub fn write(&mut self, samples: &[f32]) {
        self.write_channel(samples, 1);
    }

    /// Appends the first channel of an interleaved block. Other channels are
    /// ignored, not mixed.
    pub fn write_channel(&mut self, interleaved: &[f32], channels: usize) {
        let channels = channels.max(1);
        let frames = interleaved.len() / channels;
        // Only the newest `capacity` frames of an oversized block can survive.
        let skip = frames.saturating_sub(self.ring.capacity_frames());
        let kept = (frames - skip) as u64;

        let ring = &*self.ring;
        let mut start = ring.write_cursor.load(Ordering::Relaxed);
        let misalignment = start % FRAME_BYTES;
        if misalignment != 0 {
            start -= misalignment;
        }
        let end = start + kept * FRAME_BYTES;

        ring.reclaim(end);
        let mut cursor = start;
        for frame in interleaved.chunks_exact(channels).skip(skip) {
            ring.slot(cursor).store(frame[0].to_bits(), Ordering::Relaxed);
            cursor += FRAME_BYTES;
        }
        ring.write_cursor.store(end, Ordering::Release);
    }

    /// Frames written but not yet read.
    pub fn available_frames(&self) -> usize {
        self.ring.available_frames()
    }
}

/// Consumer half, owned by the polling thread.
pub struct CaptureReader {
    ring: Arc<Ring>,
    clock: Box<dyn SampleClock>,
    last_read: u64,
    sample_rate: u32,
}

impl CaptureReader {
    /// Takes the frames that elapsed since the previous call, capped at half of
    /// what is buffered and at `max_frames`.
    pub fn read(&mut self, max_frames: usize) -> Vec<f32> {
        let now = self.clock.now_frames();
        let elapsed = now.saturating_sub(self.last_read);
        self.last_read = now;
        let demand = usize::try_from(elapsed).unwrap_or(usize::MAX).min(max_frames);

        let ring = &*self.ring;
        loop {
            let start = ring.read_cursor.load(Ordering::Acquire);
            let write = ring.write_cursor.load(Ordering::Acquire);
            let available = (write.saturating_sub(start) / FRAME_BYTES) as usize;
            let frames = demand.min(available / 2);
            if frames == 0 {
                return Vec::new();
            }

            let mut block = Vec::with_capacity(frames);
            let mut cursor = start;
            for _ in 0..frames {
                block.push(f32::from_bits(ring.slot(cursor).load(Ordering::Relaxed)));
                cursor += FRAME_BYTES;
            }

            if ring
                .read_cursor
                .compare_exchange(start, cursor, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return block;
            }
            log::trace!("[CAPTURE] Writer overran the read region, copying again");
        }
    }

    /// Frames written but not yet read.
    pub fn available_frames(&self) -> usize {
        self.ring.available_frames()
    }

    /// Frames the ring holds before the oldest are overwritten.
    pub fn capacity_frames(&self) -> usize {
        self.ring.capacity_frames()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
impl CaptureWriter {
    fn nudge_write_cursor(&self, bytes: u64) {
        self.ring.write_cursor.fetch_add(bytes, Ordering::Relaxed);
    }
}
