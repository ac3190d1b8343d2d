//! Emission scoring for bar-position inference
//!
//! A [`BarPositionScorer`] tells the Viterbi decoder how well each beat fits
//! each position in a bar. The default [`AccentScorer`] uses onset accents:
//! loud beats look like downbeats, quiet ones like the rest of the bar.

/// Floor added inside the logarithm so a zero probability stays finite
const LOG_FLOOR: f64 = 1e-3;

/// Relative accent spread below which accents are treated as uninformative
const MIN_RELATIVE_SPREAD: f64 = 0.3;

/// Per-beat log-likelihood of every bar position
pub trait BarPositionScorer {
    /// Number of beats this scorer has observations for
    fn len(&self) -> usize;

    /// True if there are no observations
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Log-likelihood of beat `beat_index` being at each of the
    /// `beats_per_bar` positions; entry 0 is the downbeat
    fn log_likelihoods(&self, beat_index: usize, beats_per_bar: usize) -> Vec<f64>;
}

/// Accent-based scorer: strong beats favour position 1
#[derive(Debug, Clone, PartialEq)]
pub struct AccentScorer {
    accents: Vec<f64>,
    informative: bool,
}

impl AccentScorer {
    /// Build a scorer from raw per-beat accent values
    ///
    /// Accents are min-max normalized to [0, 1]. If their spread is small
    /// relative to the largest accent, or any accent is non-finite, every beat
    /// is scored as neutral (0.5).
    pub fn new(raw: &[f32]) -> Self {
        let min = raw.iter().copied().fold(f32::INFINITY, f32::min) as f64;
        let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
        let spread = max - min;

        let informative = raw.iter().all(|v| v.is_finite())
            && spread.is_finite()
            && spread > MIN_RELATIVE_SPREAD * max.abs().max(f64::MIN_POSITIVE);

        let accents = if informative {
            raw.iter().map(|&v| (v as f64 - min) / spread).collect()
        } else {
            vec![0.5; raw.len()]
        };

        if !informative && !raw.is_empty() {
            log::debug!(
                "Accents uninformative (spread {:.4} of max {:.4}), using neutral emissions",
                spread,
                max
            );
        }

        Self {
            accents,
            informative,
        }
    }

    /// Normalized accent per beat
    pub fn accents(&self) -> &[f64] {
        &self.accents
    }

    /// False when the accents carried no usable contrast
    pub fn is_informative(&self) -> bool {
        self.informative
    }
}

impl BarPositionScorer for AccentScorer {
    fn len(&self) -> usize {
        self.accents.len()
    }

    fn log_likelihoods(&self, beat_index: usize, beats_per_bar: usize) -> Vec<f64> {
        let a = self.accents.get(beat_index).copied().unwrap_or(0.5);
        let downbeat = (LOG_FLOOR + a).ln();
        let other = (LOG_FLOOR + 1.0 - a).ln();
        (0..beats_per_bar)
            .map(|pos| if pos == 0 { downbeat } else { other })
            .collect()
    }
}
