//! Spectral flux onset strength
//!
//! Measures, per frame, how much new spectral energy appeared relative to the
//! previous frame: `flux[t] = Σ_k max(0, |X_t(k)| - |X_{t-1}(k)|)`.
//!
//! # Reference
//!
//! Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
//! A Tutorial on Onset Detection in Music Signals.
//! *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.

use crate::error::AnalysisError;

/// Numerical stability epsilon
const EPSILON: f64 = 1e-10;

/// Half-wave rectified spectral flux
///
/// # Arguments
///
/// * `previous` - Frame preceding `frames`, when the spectrogram is processed
///   in blocks; `None` at the start of the signal
/// * `frames` - FFT magnitude frames (n_frames × n_bins)
///
/// # Returns
///
/// One value per frame. Without a previous frame `flux[0]` is 0, so an
/// isolated single frame yields `[0.0]`.
///
/// # Errors
///
/// `ProcessingError` if frames have inconsistent lengths.
pub fn spectral_flux(
    previous: Option<&[f32]>,
    frames: &[Vec<f32>],
) -> Result<Vec<f32>, AnalysisError> {
    let n_bins = match (previous, frames.first()) {
        (Some(prev), _) => prev.len(),
        (None, Some(first)) => first.len(),
        (None, None) => return Ok(Vec::new()),
    };

    for (i, frame) in frames.iter().enumerate() {
        if frame.len() != n_bins {
            return Err(AnalysisError::ProcessingError(format!(
                "Inconsistent frame lengths: expected {} bins, frame {} has {} bins",
                n_bins,
                i,
                frame.len()
            )));
        }
    }

    let mut flux = Vec::with_capacity(frames.len());
    let mut prev = previous;
    for frame in frames {
        let value: f32 = match prev {
            Some(p) => frame
                .iter()
                .zip(p.iter())
                .map(|(&curr, &before)| (curr - before).max(0.0))
                .sum(),
            None => 0.0,
        };
        flux.push(value);
        prev = Some(frame.as_slice());
    }

    Ok(flux)
}

/// Detrend and scale a raw flux curve
///
/// Subtracts a centered moving average of `mean_window` frames, half-wave
/// rectifies, then divides by the standard deviation of the result so that
/// loud and quiet recordings produce comparable envelopes. The output is
/// non-negative; a flat input stays all zeros.
pub fn normalize_flux(flux: &[f32], mean_window: usize) -> Vec<f32> {
    if flux.is_empty() {
        return Vec::new();
    }

    let half = mean_window / 2;
    let n = flux.len();

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    for &v in flux {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v as f64);
    }

    let detrended: Vec<f64> = (0..n)
        .map(|t| {
            let lo = t.saturating_sub(half);
            let hi = (t + half + 1).min(n);
            let local_mean = (prefix[hi] - prefix[lo]) / (hi - lo) as f64;
            (flux[t] as f64 - local_mean).max(0.0)
        })
        .collect();

    let mean = detrended.iter().sum::<f64>() / n as f64;
    let variance = detrended.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    let std = variance.sqrt();

    if std <= EPSILON {
        return vec![0.0; n];
    }

    detrended.iter().map(|&v| (v / std) as f32).collect()
}
