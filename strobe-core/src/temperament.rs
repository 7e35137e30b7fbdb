//! # Temperaments
//!
//! A temperament decides the frequencies of the eleven notes above the
//! reference pitch. Everything outside that base octave is derived by octave
//! doubling in [`crate::tuning`].

use serde::Serialize;

/// How a temperament fills the base octave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TemperamentKind {
    /// Equal divisions of the octave; the parameter is the division count.
    Equal { divisions: f64 },
    /// Built from a stack of fifths; the parameter is the ratio of the fifth.
    Syntonic { fifth: f64 },
    /// Rational intervals; the parameter is a row of [`JUST_RATIOS`].
    Just { system: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperament {
    pub name: &'static str,
    pub kind: TemperamentKind,
}

/// Interval ratios (numerator, denominator) for semitone offsets 1..=11.
pub const JUST_RATIOS: [[(u32, u32); 11]; 12] = [
    // 5-limit (Symmetric 1 Aug 4th)
    [(16, 15), (9, 8), (6, 5), (5, 4), (4, 3), (45, 32), (3, 2), (8, 5), (5, 3), (16, 9), (15, 8)],
    // 5-limit (Symmetric 1 Dim 5th)
    [(16, 15), (9, 8), (6, 5), (5, 4), (4, 3), (64, 45), (3, 2), (8, 5), (5, 3), (16, 9), (15, 8)],
    // 5-limit (Symmetric 2 Aug 4th)
    [(16, 15), (10, 9), (6, 5), (5, 4), (4, 3), (45, 32), (3, 2), (8, 5), (5, 3), (9, 5), (15, 8)],
    // 5-limit (Symmetric 2 Dim 5th)
    [(16, 15), (10, 9), (6, 5), (5, 4), (4, 3), (64, 45), (3, 2), (8, 5), (5, 3), (9, 5), (15, 8)],
    // 5-limit (Asymmetric Standard Aug 4th)
    [(16, 15), (9, 8), (6, 5), (5, 4), (4, 3), (45, 32), (3, 2), (8, 5), (5, 3), (9, 5), (15, 8)],
    // 5-limit (Asymmetric Standard Dim 5th)
    [(16, 15), (9, 8), (6, 5), (5, 4), (4, 3), (64, 45), (3, 2), (8, 5), (5, 3), (9, 5), (15, 8)],
    // 5-limit (Asymmetric Extended Aug 4th)
    [(16, 15), (9, 8), (6, 5), (5, 4), (4, 3), (25, 18), (3, 2), (8, 5), (5, 3), (9, 5), (15, 8)],
    // 5-limit (Asymmetric Extended Dim 5th)
    [(16, 15), (9, 8), (6, 5), (5, 4), (4, 3), (36, 25), (3, 2), (8, 5), (5, 3), (9, 5), (15, 8)],
    // 7-limit (Aug 4th)
    [(16, 15), (8, 7), (6, 5), (5, 4), (4, 3), (7, 5), (3, 2), (8, 5), (5, 3), (7, 4), (15, 8)],
    // 7-limit (Dim 5th)
    [(16, 15), (8, 7), (6, 5), (5, 4), (4, 3), (10, 7), (3, 2), (8, 5), (5, 3), (7, 4), (15, 8)],
    // 17-limit (Aug 4th)
    [(16, 15), (8, 7), (6, 5), (5, 4), (4, 3), (17, 12), (3, 2), (8, 5), (5, 3), (7, 4), (15, 8)],
    // 17-limit (Dim 5th)
    [(16, 15), (8, 7), (6, 5), (5, 4), (4, 3), (24, 17), (3, 2), (8, 5), (5, 3), (7, 4), (15, 8)],
];

/// Circle-of-fifths exponents (a, b) for semitone offsets 1..=11: the note
/// lies at `fifth^a / 2^b` above the reference.
pub const SYNTONIC_EXPONENTS: [(i32, i32); 11] = [
    (7, 4),
    (2, 1),
    (9, 5),
    (4, 2),
    (11, 6),
    (6, 3),
    (1, 0),
    (8, 4),
    (3, 1),
    (10, 5),
    (5, 2),
];

fn edo_fifth(steps: f64, divisions: f64) -> f64 {
    2f64.powf(steps / divisions)
}

/// The ordered temperament catalog. Index 0 is the default.
pub fn catalog() -> Vec<Temperament> {
    use TemperamentKind::*;

    let syntonic = |name, fifth| Temperament { name, kind: Syntonic { fifth } };
    let just = |name, system| Temperament { name, kind: Just { system } };

    vec![
        Temperament { name: "12-edo (standard)", kind: Equal { divisions: 12.0 } },
        syntonic("Syntonic (5-TET)", edo_fifth(3.0, 5.0)),
        syntonic("Syntonic (22-TET)", edo_fifth(13.0, 22.0)),
        syntonic("Syntonic (17-TET)", edo_fifth(10.0, 17.0)),
        syntonic("Syntonic (Pythagorean)", 1.5),
        syntonic("Syntonic (12-TET)", edo_fifth(7.0, 12.0)),
        syntonic("Syntonic (43-TET, 1/5 Comma)", edo_fifth(25.0, 43.0)),
        syntonic("Syntonic (31-TET, 1/4 Comma)", edo_fifth(18.0, 31.0)),
        syntonic("Syntonic (50-TET, 2/7 Comma)", edo_fifth(29.0, 50.0)),
        syntonic("Syntonic (19-TET, 1/3 Comma)", edo_fifth(11.0, 19.0)),
        syntonic("Syntonic (26-TET)", edo_fifth(15.0, 26.0)),
        syntonic("Syntonic (7-TET)", edo_fifth(4.0, 7.0)),
        just("Just 5-limit (Symmetric 1 Aug 4th)", 0),
        just("Just 5-limit (Symmetric 1 Dim 5th)", 1),
        just("Just 5-limit (Symmetric 2 Aug 4th)", 2),
        just("Just 5-limit (Symmetric 2 Dim 5th)", 3),
        just("Just 5-limit (Asymmetric Standard Aug 4th)", 4),
        just("Just 5-limit (Asymmetric Standard Dim 5th)", 5),
        just("Just 5-limit (Asymmetric Extended Aug 4th)", 6),
        just("Just 5-limit (Asymmetric Extended Dim 5th)", 7),
        just("Just 7-limit (Aug 4th)", 8),
        just("Just 7-limit (Dim 5th)", 9),
        just("Just 17-limit (Aug 4th)", 10),
        just("Just 17-limit (Dim 5th)", 11),
    ]
}

impl Temperament {
    /// Frequency ratios of the base octave: index 0 is the reference itself
    /// (always 1.0), index p is p semitones above it.
    pub fn octave_ratios(&self) -> [f64; 12] {
        let mut ratios = [1.0; 12];
        match self.kind {
            TemperamentKind::Equal { divisions } => {
                for (p, ratio) in ratios.iter_mut().enumerate().skip(1) {
                    *ratio = 2f64.powf(p as f64 / divisions);
                }
            }
            TemperamentKind::Syntonic { fifth } => {
                for (ratio, &(a, b)) in ratios[1..].iter_mut().zip(SYNTONIC_EXPONENTS.iter()) {
                    *ratio = fifth.powi(a) / 2f64.powi(b);
                }
            }
            TemperamentKind::Just { system } => {
                // Out-of-range rows cannot come from the catalog; fall back to unison.
                if let Some(row) = JUST_RATIOS.get(system) {
                    for (ratio, &(num, den)) in ratios[1..].iter_mut().zip(row.iter()) {
                        *ratio = num as f64 / den as f64;
                    }
                }
            }
        }
        ratios
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn catalog_order_and_defaults() {
        let temps = catalog();
        assert_eq!(temps.len(), 24);
        assert_eq!(temps[0].kind, TemperamentKind::Equal { divisions: 12.0 });
        assert_eq!(temps[4].kind, TemperamentKind::Syntonic { fifth: 1.5 });
        assert_eq!(temps[23].kind, TemperamentKind::Just { system: 11 });
    }

    #[test]
    fn syntonic_12_tet_matches_equal() {
        let temps = catalog();
        let equal = temps[0].octave_ratios();
        let syntonic = temps[5].octave_ratios();
        for p in 0..12 {
            assert_relative_eq!(equal[p], syntonic[p], max_relative = 1e-12);
        }
    }

    #[test]
    fn base_octave_stays_within_one_octave() {
        for temp in catalog() {
            let ratios = temp.octave_ratios();
            for (p, ratio) in ratios.iter().enumerate().skip(1) {
                // Coarse EDO fifths (5-TET, 7-TET) land some notes exactly on the bounds.
                assert!(
                    *ratio >= 1.0 - 1e-9 && *ratio <= 2.0 + 1e-9,
                    "{} offset {p}: {ratio}",
                    temp.name
                );
            }
        }
    }

    #[test]
    fn pythagorean_intervals() {
        let ratios = catalog()[4].octave_ratios();
        assert_relative_eq!(ratios[7], 1.5);
        assert_relative_eq!(ratios[2], 9.0 / 8.0);
        assert_relative_eq!(ratios[9], 27.0 / 16.0);
    }

    #[test]
    fn just_rows_use_the_ratio_table() {
        let ratios = catalog()[20].octave_ratios();
        assert_relative_eq!(ratios[4], 5.0 / 4.0);
        assert_relative_eq!(ratios[6], 7.0 / 5.0);
        assert_relative_eq!(ratios[10], 7.0 / 4.0);
    }
}
