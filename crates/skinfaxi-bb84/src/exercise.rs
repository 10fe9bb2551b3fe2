//! Detector-table drills for manual basis-matching practice.
//!
//! Generates rows of (photon polarisation, analyser orientation) pairs and
//! the outcome a polarising beam splitter produces: the transmitted
//! detector fires (`0`), the reflected detector fires (`1`), or both fire
//! with equal probability and the outcome is random (`r`).

use rand::Rng;
use serde::Serialize;

/// Photon polarisations used in the drill, in degrees.
pub const POLARISATIONS: [i16; 4] = [-45, 0, 45, 90];

/// Analyser orientations used in the drill, in degrees.
pub const ANALYSERS: [i16; 2] = [0, 45];

/// Which detector fires behind the analyser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Detector {
    /// Only the transmitted-port detector fires.
    Transmitted,
    /// Only the reflected-port detector fires.
    Reflected,
    /// Both ports are possible — the click is random.
    Both,
}

/// The ideal receiver bit for a drill row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    /// Deterministic `0`.
    Zero,
    /// Deterministic `1`.
    One,
    /// Uninformative — any outcome is possible.
    Random,
}

impl Expected {
    /// The symbol a student writes for this outcome.
    pub fn symbol(self) -> char {
        match self {
            Expected::Zero => '0',
            Expected::One => '1',
            Expected::Random => 'r',
        }
    }

    /// Whether a free-form answer names this outcome.
    pub fn matches(self, answer: &str) -> bool {
        let answer = answer.trim();
        match self {
            Expected::Zero => answer == "0",
            Expected::One => answer == "1",
            Expected::Random => answer.eq_ignore_ascii_case("r"),
        }
    }
}

/// Detector response for a polarisation/analyser pair.
///
/// Returns `None` for angles outside the drill table.
pub fn detector_response(polarisation: i16, analyser: i16) -> Option<Detector> {
    match (polarisation, analyser) {
        (0, 0) | (-45, 45) => Some(Detector::Transmitted),
        (90, 0) | (45, 45) => Some(Detector::Reflected),
        (-45, 0) | (0, 45) | (45, 0) | (90, 45) => Some(Detector::Both),
        _ => None,
    }
}

impl Detector {
    /// The ideal receiver bit for this response.
    pub fn expected(self) -> Expected {
        match self {
            Detector::Transmitted => Expected::Zero,
            Detector::Reflected => Expected::One,
            Detector::Both => Expected::Random,
        }
    }

    /// Label for the drill table.
    pub fn describe(self) -> &'static str {
        match self {
            Detector::Transmitted => "transmitted",
            Detector::Reflected => "reflected",
            Detector::Both => "both",
        }
    }
}

/// One drill row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExerciseRow {
    /// 1-based row number.
    pub seq: usize,
    /// Photon polarisation in degrees.
    pub polarisation: i16,
    /// Analyser orientation in degrees.
    pub analyser: i16,
    /// Detector response for this pair.
    pub detector: Detector,
    /// The answer the row expects.
    pub expected: Expected,
}

/// A generated drill sheet.
#[derive(Debug, Clone, Serialize)]
pub struct Exercise {
    /// Drill rows in presentation order.
    pub rows: Vec<ExerciseRow>,
}

/// Result of grading a drill sheet.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseScore {
    /// Number of rows in the sheet.
    pub total: usize,
    /// Correctly answered rows.
    pub correct: usize,
    /// Per-row correctness, aligned with the sheet.
    pub results: Vec<bool>,
}

impl Exercise {
    /// Generate `n` random drill rows.
    pub fn generate<R: Rng>(n: usize, rng: &mut R) -> Self {
        let rows = (0..n)
            .map(|i| {
                let polarisation = POLARISATIONS[rng.gen_range(0..POLARISATIONS.len())];
                let analyser = ANALYSERS[rng.gen_range(0..ANALYSERS.len())];
                let detector = detector_response(polarisation, analyser)
                    .expect("drill angles come from the fixed table");
                ExerciseRow {
                    seq: i + 1,
                    polarisation,
                    analyser,
                    detector,
                    expected: detector.expected(),
                }
            })
            .collect();
        Self { rows }
    }

    /// Grade a sheet of answers. Missing answers count as wrong.
    pub fn grade<S: AsRef<str>>(&self, answers: &[S]) -> ExerciseScore {
        let results: Vec<bool> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                answers
                    .get(i)
                    .is_some_and(|a| row.expected.matches(a.as_ref()))
            })
            .collect();
        ExerciseScore {
            total: self.rows.len(),
            correct: results.iter().filter(|&&ok| ok).count(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn table_covers_all_drill_pairs() {
        for &p in &POLARISATIONS {
            for &a in &ANALYSERS {
                assert!(detector_response(p, a).is_some(), "missing ({p}, {a})");
            }
        }
        assert_eq!(detector_response(30, 0), None);
    }

    #[test]
    fn deterministic_pairs_map_to_bits() {
        assert_eq!(detector_response(0, 0), Some(Detector::Transmitted));
        assert_eq!(detector_response(90, 0), Some(Detector::Reflected));
        assert_eq!(detector_response(-45, 45), Some(Detector::Transmitted));
        assert_eq!(detector_response(45, 45), Some(Detector::Reflected));
    }

    #[test]
    fn grading_accepts_case_insensitive_random() {
        let mut rng = SmallRng::seed_from_u64(3);
        let exercise = Exercise::generate(5, &mut rng);
        let perfect: Vec<String> = exercise
            .rows
            .iter()
            .map(|r| match r.expected {
                Expected::Random => "R".to_string(),
                other => other.symbol().to_string(),
            })
            .collect();
        let score = exercise.grade(&perfect);
        assert_eq!(score.correct, score.total);
    }

    #[test]
    fn short_answer_sheets_mark_missing_rows_wrong() {
        let mut rng = SmallRng::seed_from_u64(9);
        let exercise = Exercise::generate(4, &mut rng);
        let score = exercise.grade(&[""; 0]);
        assert_eq!(score.correct, 0);
        assert_eq!(score.results, vec![false; 4]);
    }
}
