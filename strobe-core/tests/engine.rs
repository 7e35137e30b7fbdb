use std::f32::consts::PI;

use strobe_core::capture::{CaptureBuffer, CaptureWriter, ManualClock};
use strobe_core::wheel::{DEFAULT_HISTORY_DEPTH, Wheel};
use strobe_core::{ConfigurationError, EngineConfig, StrobeEngine};

const RATE: u32 = 32_000;
const PERIOD: usize = 32;
const CHUNK: usize = 1_600;
const VIOLIN: usize = 6;

/// Violin strings with A4 pinned to 1000 Hz, so the A4 wheel spans exactly
/// 32 input samples at 32 kHz.
fn locked_engine() -> StrobeEngine {
    StrobeEngine::new(EngineConfig {
        scale: VIOLIN,
        reference_frequency: 1000.0,
        ..Default::default()
    })
    .unwrap()
}

fn sine(periods: usize) -> Vec<f32> {
    (0..PERIOD * periods)
        .map(|k| (2.0 * PI * (k % PERIOD) as f32 / PERIOD as f32).sin())
        .collect()
}

fn connect(engine: &mut StrobeEngine) -> (CaptureWriter, ManualClock) {
    let clock = ManualClock::new();
    let (mut writer, reader) = CaptureBuffer::new(0.2, RATE).unwrap().split(clock.clone());
    // keep a backlog so every read takes exactly one chunk
    writer.write(&sine(2 * CHUNK / PERIOD));
    engine.connect(reader);
    (writer, clock)
}

fn cycle(engine: &mut StrobeEngine, writer: &mut CaptureWriter, clock: &ManualClock) {
    writer.write(&sine(CHUNK / PERIOD));
    clock.advance(CHUNK as u64);
    assert!(engine.poll());
}

#[test]
fn locked_wheel_is_stable_and_selected() {
    let mut engine = locked_engine();
    let (mut writer, clock) = connect(&mut engine);
    assert_eq!(engine.wheels()[2].sample_count(), 31);

    cycle(&mut engine, &mut writer, &clock);
    assert!(engine.wheels()[2].instability() > 0.0);

    for _ in 0..DEFAULT_HISTORY_DEPTH {
        cycle(&mut engine, &mut writer, &clock);
    }

    let a4 = &engine.wheels()[2];
    assert_eq!(a4.label(), "A4");
    assert_eq!(a4.instability(), 0.0);
    assert_eq!(a4.zero_crossings(), 2);

    let selected: Vec<bool> = engine.wheels().iter().map(Wheel::selected).collect();
    assert_eq!(selected, [false, false, true, false]);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.wheels[2].intensity, 1.0);
    assert!(snapshot.wheels[0].intensity <= 0.05);
}

#[test]
fn manual_mode_keeps_every_wheel() {
    let mut engine = locked_engine();
    engine.set_autoselect(false);
    let (mut writer, clock) = connect(&mut engine);
    for _ in 0..3 {
        cycle(&mut engine, &mut writer, &clock);
    }
    assert!(engine.wheels().iter().all(Wheel::selected));
}

#[test]
fn retuning_mid_stream_starts_over() {
    let mut engine = locked_engine();
    let (mut writer, clock) = connect(&mut engine);
    for _ in 0..=DEFAULT_HISTORY_DEPTH {
        cycle(&mut engine, &mut writer, &clock);
    }
    assert_eq!(engine.wheels()[2].instability(), 0.0);

    assert!(engine.set_reference_frequency(440.0).unwrap());
    assert_eq!(engine.wheels()[2].frequency(), 440.0);
    assert_eq!(engine.wheels()[2].max_amplitude(), 0.0);
    assert!(engine.is_connected());
}

#[test]
fn bad_changes_are_rejected_without_side_effects() {
    let mut engine = locked_engine();
    let before = engine.snapshot();

    assert_eq!(
        engine.select_temperament(100),
        Err(ConfigurationError::TemperamentIndex { index: 100, count: 24 })
    );
    assert!(matches!(
        engine.select_scale(42),
        Err(ConfigurationError::ScaleIndex { index: 42, .. })
    ));
    assert_eq!(
        engine.set_reference_frequency(-1.0),
        Err(ConfigurationError::ReferenceFrequency(-1.0))
    );

    assert_eq!(engine.snapshot(), before);
}

#[test]
fn disconnect_freezes_the_wheels() {
    let mut engine = locked_engine();
    let (mut writer, clock) = connect(&mut engine);
    cycle(&mut engine, &mut writer, &clock);
    let frozen = engine.snapshot();

    engine.disconnect();
    writer.write(&sine(10));
    clock.advance(320);
    assert!(!engine.poll());
    assert_eq!(engine.snapshot(), frozen);
}
