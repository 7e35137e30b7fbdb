//! Text rendering of engine snapshots for a terminal.

use strobe_core::view::{Snapshot, WheelView};

/// Characters used for the folded waveform, from fully lit to dimmed.
const LIT: (char, char) = ('#', '.');
const DIM: (char, char) = ('+', ' ');
const STRIP_WIDTH: usize = 32;

/// One line per wheel: marker, label, frequency, instability and a strip
/// showing the sign of the folded waveform.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = format!(
        "{} | {} | {} = {:.2} Hz\n",
        snapshot.temperament, snapshot.scale, snapshot.reference.name, snapshot.reference.frequency
    );
    for wheel in &snapshot.wheels {
        out.push_str(&render_wheel(wheel));
        out.push('\n');
    }
    out
}

fn render_wheel(wheel: &WheelView) -> String {
    let marker = if wheel.selected { '>' } else { ' ' };
    format!(
        "{marker} {:<10} {:>9.2} Hz  {:>6.3}  [{}]",
        wheel.label,
        wheel.frequency,
        wheel.instability,
        strip(&wheel.samples, wheel.intensity, STRIP_WIDTH)
    )
}

/// Resamples the folded waveform to `width` cells, one per sign.
fn strip(samples: &[f32], intensity: f32, width: usize) -> String {
    if samples.is_empty() {
        return " ".repeat(width);
    }
    let (high, low) = if intensity >= 0.5 { LIT } else { DIM };
    (0..width)
        .map(|i| {
            let sample = samples[i * samples.len() / width];
            if sample >= 0.0 { high } else { low }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_follows_the_sign() {
        let samples = [1.0, 1.0, -1.0, -1.0];
        assert_eq!(strip(&samples, 1.0, 8), "####....");
        assert_eq!(strip(&samples, 0.1, 4), "++  ");
        assert_eq!(strip(&[], 1.0, 3), "   ");
    }

    #[test]
    fn selected_wheels_are_marked() {
        let wheel = WheelView {
            label: "A4".into(),
            frequency: 440.0,
            instability: 0.0,
            selected: true,
            max_amplitude: 1.0,
            intensity: 1.0,
            samples: vec![1.0, -1.0],
        };
        let line = render_wheel(&wheel);
        assert!(line.starts_with("> A4"));
        assert!(line.contains("440.00 Hz"));
    }
}
