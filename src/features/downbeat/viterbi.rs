//! Viterbi decoding of bar positions
//!
//! Hidden states are the positions `1..=L` inside a bar of `L` beats. A beat
//! normally advances the position by one (wrapping to 1 after `L`); any other
//! move is an anomaly sharing a small probability mass. The initial state
//! favours the downbeat.

use super::emission::BarPositionScorer;
use crate::error::AnalysisError;

/// Weight of position 1 in the initial distribution, relative to the others
const DOWNBEAT_INITIAL_WEIGHT: f64 = 2.0;

/// Bar-position HMM for one bar length
#[derive(Debug, Clone, PartialEq)]
pub struct BarModel {
    beats_per_bar: usize,
    log_initial: Vec<f64>,
    log_advance: f64,
    log_anomaly: f64,
}

impl BarModel {
    /// Build the model for `beats_per_bar` positions
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `beats_per_bar < 2` or the anomaly probability is not
    /// in (0, 1).
    pub fn new(beats_per_bar: usize, anomaly_probability: f64) -> Result<Self, AnalysisError> {
        if beats_per_bar < 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "Bar length must be >= 2, got {}",
                beats_per_bar
            )));
        }
        if !(anomaly_probability > 0.0 && anomaly_probability < 1.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "Anomaly probability must be in (0, 1), got {}",
                anomaly_probability
            )));
        }

        let total = DOWNBEAT_INITIAL_WEIGHT + (beats_per_bar - 1) as f64;
        let log_initial = (0..beats_per_bar)
            .map(|pos| {
                let w = if pos == 0 { DOWNBEAT_INITIAL_WEIGHT } else { 1.0 };
                (w / total).ln()
            })
            .collect();

        Ok(Self {
            beats_per_bar,
            log_initial,
            log_advance: (1.0 - anomaly_probability).ln(),
            log_anomaly: (anomaly_probability / (beats_per_bar - 1) as f64).ln(),
        })
    }

    fn log_transition(&self, from: usize, to: usize) -> f64 {
        if to == (from + 1) % self.beats_per_bar {
            self.log_advance
        } else {
            self.log_anomaly
        }
    }

    /// Most likely position sequence for the scorer's beats
    ///
    /// Returns 1-based positions and the joint log-likelihood of the path.
    /// Ties keep the lowest state index.
    ///
    /// # Errors
    ///
    /// - `ProcessingError` if the scorer returns the wrong number of entries
    /// - `NumericalError` on NaN emissions or if no path has finite likelihood
    pub fn decode(
        &self,
        scorer: &dyn BarPositionScorer,
    ) -> Result<(Vec<usize>, f64), AnalysisError> {
        let n_beats = scorer.len();
        if n_beats == 0 {
            return Ok((Vec::new(), 0.0));
        }

        let n_states = self.beats_per_bar;
        let mut previous: Vec<f64> = Vec::with_capacity(n_states);
        let mut current = vec![f64::NEG_INFINITY; n_states];
        let mut backpointers = vec![0usize; n_beats * n_states];

        let first = self.emissions(scorer, 0)?;
        for state in 0..n_states {
            previous.push(self.log_initial[state] + first[state]);
        }

        for beat in 1..n_beats {
            let dens = self.emissions(scorer, beat)?;
            for state in 0..n_states {
                let mut best = f64::NEG_INFINITY;
                let mut best_prev = 0usize;
                for (prev_state, &score) in previous.iter().enumerate() {
                    let candidate = score + self.log_transition(prev_state, state);
                    if candidate > best {
                        best = candidate;
                        best_prev = prev_state;
                    }
                }
                current[state] = best + dens[state];
                backpointers[beat * n_states + state] = best_prev;
            }
            previous.copy_from_slice(&current);
        }

        let mut best_state = 0usize;
        let mut best_log = f64::NEG_INFINITY;
        for (state, &v) in previous.iter().enumerate() {
            if v > best_log {
                best_log = v;
                best_state = state;
            }
        }

        if !best_log.is_finite() {
            return Err(AnalysisError::NumericalError(format!(
                "No finite bar-position path for {} beats per bar",
                n_states
            )));
        }

        let mut path = vec![0usize; n_beats];
        let mut state = best_state;
        for beat in (0..n_beats).rev() {
            path[beat] = state + 1;
            state = backpointers[beat * n_states + state];
        }

        Ok((path, best_log))
    }

    fn emissions(
        &self,
        scorer: &dyn BarPositionScorer,
        beat: usize,
    ) -> Result<Vec<f64>, AnalysisError> {
        let dens = scorer.log_likelihoods(beat, self.beats_per_bar);
        if dens.len() != self.beats_per_bar {
            return Err(AnalysisError::ProcessingError(format!(
                "Scorer returned {} log-likelihoods for a bar of {}",
                dens.len(),
                self.beats_per_bar
            )));
        }
        if dens.iter().any(|v| v.is_nan()) {
            return Err(AnalysisError::NumericalError(format!(
                "NaN emission at beat {}",
                beat
            )));
        }
        Ok(dens)
    }
}
