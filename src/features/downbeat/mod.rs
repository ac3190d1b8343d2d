//! Downbeat and meter inference
//!
//! Assign every beat a position within its bar and choose the bar length:
//! - Per-beat accent from the onset envelope
//! - Viterbi decoding per candidate bar length
//! - Meter prior and softmax confidence across hypotheses

pub mod emission;
pub mod viterbi;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::beat_tracking::BeatSequence;
use crate::features::onset::OnsetEnvelope;

use emission::{AccentScorer, BarPositionScorer};
use viterbi::BarModel;

/// Winning bar-position assignment for a beat sequence
#[derive(Debug, Clone, PartialEq)]
pub struct MeterAssignment {
    /// Beats per bar of the winning hypothesis
    pub beats_per_bar: usize,

    /// Position of every beat in its bar, in `1..=beats_per_bar`
    pub positions: Vec<usize>,

    /// Path log-likelihood plus log meter prior
    pub log_likelihood: f64,

    /// Softmax weight of the winner among evaluated bar lengths (0.0-1.0)
    pub confidence: f64,
}

impl MeterAssignment {
    /// Indices of beats at position 1
    pub fn downbeat_indices(&self) -> Vec<usize> {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, &p)| p == 1)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Accent of each beat: summed onset strength within `radius` frames
///
/// Summing over the whole onset peak keeps the accent independent of where
/// the onset falls between two analysis frames.
pub fn beat_accents(envelope: &OnsetEnvelope, frames: &[usize], radius: usize) -> Vec<f32> {
    let values = envelope.values();
    if values.is_empty() {
        return vec![0.0; frames.len()];
    }
    frames
        .iter()
        .map(|&f| {
            let lo = f.saturating_sub(radius).min(values.len() - 1);
            let hi = (f + radius).min(values.len() - 1);
            values[lo..=hi].iter().sum()
        })
        .collect()
}

/// Prior probability of each configured bar length
fn meter_prior(bar_lengths: &[usize], preferred: usize, preferred_weight: f64) -> Vec<f64> {
    let n = bar_lengths.len();
    let n_preferred = bar_lengths.iter().filter(|&&l| l == preferred).count();

    if n_preferred == 0 || n_preferred == n {
        return vec![1.0 / n as f64; n];
    }

    let rest = (1.0 - preferred_weight) / (n - n_preferred) as f64;
    bar_lengths
        .iter()
        .map(|&l| {
            if l == preferred {
                preferred_weight / n_preferred as f64
            } else {
                rest
            }
        })
        .collect()
}

/// Infer meter and downbeats using the onset-accent scorer
///
/// Returns `None` when there are fewer beats than every allowed bar length.
///
/// # Errors
///
/// See [`infer_meter_with`].
pub fn infer_meter(
    beats: &BeatSequence,
    envelope: &OnsetEnvelope,
    config: &AnalysisConfig,
) -> Result<Option<MeterAssignment>, AnalysisError> {
    let accents = beat_accents(envelope, &beats.frames, config.accent_radius);
    let scorer = AccentScorer::new(&accents);
    infer_meter_with(&scorer, config)
}

/// Infer meter with any bar-position scorer
///
/// Every bar length in `config.bar_lengths` that does not exceed the number of
/// beats is decoded; the highest path score plus log prior wins, with ties
/// going to the earlier entry.
///
/// # Errors
///
/// - `InvalidInput` for an empty or invalid bar-length set
/// - `ProcessingError` / `NumericalError` from decoding
pub fn infer_meter_with(
    scorer: &dyn BarPositionScorer,
    config: &AnalysisConfig,
) -> Result<Option<MeterAssignment>, AnalysisError> {
    if config.bar_lengths.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "At least one bar length is required".to_string(),
        ));
    }

    let n_beats = scorer.len();
    let prior = meter_prior(
        &config.bar_lengths,
        config.preferred_bar_length,
        config.preferred_meter_weight as f64,
    );

    let mut hypotheses: Vec<(usize, Vec<usize>, f64)> = Vec::new();
    for (&length, &p) in config.bar_lengths.iter().zip(prior.iter()) {
        if length > n_beats {
            log::debug!("Skipping {} beats per bar: only {} beats", length, n_beats);
            continue;
        }
        let model = BarModel::new(length, config.anomaly_probability as f64)?;
        let (positions, path_log) = model.decode(scorer)?;
        let score = path_log + p.ln();
        log::debug!(
            "Meter hypothesis {} beats per bar: path {:.3}, prior {:.2}, score {:.3}",
            length,
            path_log,
            p,
            score
        );
        hypotheses.push((length, positions, score));
    }

    if hypotheses.is_empty() {
        log::warn!(
            "Too few beats ({}) for any bar length in {:?}",
            n_beats,
            config.bar_lengths
        );
        return Ok(None);
    }

    let mut best = 0usize;
    for (i, h) in hypotheses.iter().enumerate() {
        if h.2 > hypotheses[best].2 {
            best = i;
        }
    }

    let max_score = hypotheses[best].2;
    let norm: f64 = hypotheses.iter().map(|h| (h.2 - max_score).exp()).sum();
    let confidence = 1.0 / norm;

    let (beats_per_bar, positions, log_likelihood) = hypotheses.swap_remove(best);

    log::debug!(
        "Meter: {} beats per bar (confidence {:.3})",
        beats_per_bar,
        confidence
    );

    Ok(Some(MeterAssignment {
        beats_per_bar,
        positions,
        log_likelihood,
        confidence,
    }))
}
