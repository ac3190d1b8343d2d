//! Period estimation (tempo detection)
//!
//! Convert the onset envelope to a single dominant tempo:
//! - FFT-accelerated autocorrelation
//! - Windowed autocorrelation tempogram
//! - Peak picking with octave-aware tie-breaking

pub mod autocorrelation;
pub mod peak_picking;
pub mod tempogram;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::OnsetEnvelope;

/// Lag strengths below this are FFT round-off, not periodicity
const MIN_PERIODICITY: f32 = 1e-3;

/// Dominant tempo of a track
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEstimate {
    /// Tempo in beats per minute; 0 means no periodicity was found
    pub bpm: f32,

    /// Periodicity strength of the chosen lag (0.0-1.0)
    pub confidence: f32,

    /// Beat period in onset frames (fractional); 0 when `bpm` is 0
    pub period_frames: f32,

    /// More than one candidate was within the tie tolerance of the best one
    pub ambiguous: bool,
}

impl TempoEstimate {
    /// The "no tempo" result used for silence and too-short inputs
    pub fn none() -> Self {
        Self {
            bpm: 0.0,
            confidence: 0.0,
            period_frames: 0.0,
            ambiguous: false,
        }
    }

    /// True if a tempo was found
    pub fn is_some(&self) -> bool {
        self.bpm > 0.0
    }
}

/// Estimate the dominant tempo of an onset envelope
///
/// # Algorithm
///
/// 1. Lag range from the BPM bounds: `lag = 60 * fps / bpm`
/// 2. Mean tempogram over Hann-weighted windows
/// 3. Local maxima inside the lag range are candidates
/// 4. Candidates within `tempo_tie_tolerance` of the strongest are ties; the
///    one closest to `preferred_bpm_range` wins, which suppresses half/double
///    tempo errors
/// 5. Parabolic refinement of the winning lag, converted back to BPM
///
/// Silence, envelopes too short to hold two minimal periods, and curves with no
/// positive periodicity all return [`TempoEstimate::none`].
///
/// # Errors
///
/// `InvalidInput` for an invalid BPM range, `NumericalError` if the tempogram
/// is not finite.
pub fn estimate_tempo(
    envelope: &OnsetEnvelope,
    config: &AnalysisConfig,
) -> Result<TempoEstimate, AnalysisError> {
    if !(config.min_bpm > 0.0) || !(config.max_bpm > config.min_bpm) {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            config.min_bpm, config.max_bpm
        )));
    }

    if envelope.is_silent() {
        log::debug!("Onset envelope is silent, no tempo");
        return Ok(TempoEstimate::none());
    }

    let fps = envelope.frame_rate();
    let lag_min = ((60.0 * fps / config.max_bpm).ceil() as usize).max(1);
    let lag_max = (60.0 * fps / config.min_bpm).floor() as usize;

    if lag_max < lag_min {
        return Err(AnalysisError::InvalidInput(format!(
            "BPM range [{:.1}, {:.1}] has no whole-frame lag at {:.2} fps",
            config.min_bpm, config.max_bpm, fps
        )));
    }

    if envelope.len() < 2 * lag_min {
        log::debug!(
            "Envelope too short for tempo estimation: {} frames, minimum lag {}",
            envelope.len(),
            lag_min
        );
        return Ok(TempoEstimate::none());
    }

    // Window must be able to express the longest lag more than once.
    let window = config.tempogram_window.max(2 * (lag_max + 1));
    let strength = tempogram::mean_tempogram(envelope.values(), window)?;

    let mut candidates: Vec<(usize, f32)> =
        peak_picking::find_peaks_in_range(&strength, lag_min, lag_max)
            .into_iter()
            .filter(|&(_, v)| v >= MIN_PERIODICITY)
            .collect();
    if candidates.is_empty() {
        // Monotone curve inside the range: fall back to the strongest lag.
        let mut best: Option<(usize, f32)> = None;
        for lag in lag_min..=lag_max.min(strength.len() - 1) {
            if strength[lag] >= MIN_PERIODICITY && best.map_or(true, |(_, v)| strength[lag] > v) {
                best = Some((lag, strength[lag]));
            }
        }
        match best {
            Some(b) => candidates.push(b),
            None => {
                log::warn!("No periodicity found in onset envelope");
                return Ok(TempoEstimate::none());
            }
        }
    }

    let best_strength = candidates
        .iter()
        .map(|&(_, v)| v)
        .fold(0.0f32, f32::max);
    let tie_floor = best_strength * (1.0 - config.tempo_tie_tolerance);
    let ties: Vec<(usize, f32)> = candidates
        .iter()
        .copied()
        .filter(|&(_, v)| v >= tie_floor)
        .collect();

    let (lo_pref, hi_pref) = config.preferred_bpm_range;
    let preference_distance = |lag: usize| -> f32 {
        let bpm = 60.0 * fps / lag as f32;
        if bpm < lo_pref {
            lo_pref - bpm
        } else if bpm > hi_pref {
            bpm - hi_pref
        } else {
            0.0
        }
    };

    let mut chosen = ties[0];
    for &(lag, value) in ties.iter().skip(1) {
        let d_new = preference_distance(lag);
        let d_old = preference_distance(chosen.0);
        if d_new < d_old || (d_new == d_old && value > chosen.1) {
            chosen = (lag, value);
        }
    }

    let period_frames = peak_picking::refine_peak(&strength, chosen.0);
    let bpm = (60.0 * fps / period_frames).clamp(config.min_bpm, config.max_bpm);

    if !bpm.is_finite() {
        return Err(AnalysisError::NumericalError(format!(
            "Non-finite BPM from period {:.3} frames",
            period_frames
        )));
    }

    let estimate = TempoEstimate {
        bpm,
        confidence: chosen.1.clamp(0.0, 1.0),
        period_frames: 60.0 * fps / bpm,
        ambiguous: ties.len() > 1,
    };

    log::debug!(
        "Tempo: {:.2} BPM (lag {} -> {:.2} frames, strength {:.3}, {} candidates, {} tied)",
        estimate.bpm,
        chosen.0,
        estimate.period_frames,
        estimate.confidence,
        candidates.len(),
        ties.len()
    );

    Ok(estimate)
}
