//! Autocorrelation tempogram
//!
//! The onset envelope is cut into overlapping Hann-weighted windows; each
//! window's autocorrelation is normalized by its lag-0 energy, and the
//! per-lag mean across windows gives a global periodicity-strength curve.
//!
//! # Reference
//!
//! Grosche, P., Müller, M., & Kurth, F. (2010). Cyclic Tempogram - A Mid-level
//! Tempo Representation for Music Signals. *ICASSP*.
//!
//! # Example
//!
//! ```
//! use cadence_dsp::features::period::tempogram::mean_tempogram;
//!
//! let mut envelope = vec![0.0f32; 600];
//! for i in (0..600).step_by(40) {
//!     envelope[i] = 1.0;
//! }
//! let strength = mean_tempogram(&envelope, 384)?;
//! assert!(strength[40] > strength[20]);
//! # Ok::<(), cadence_dsp::AnalysisError>(())
//! ```

use rustfft::FftPlanner;

use super::autocorrelation::autocorrelation_fft;
use crate::error::AnalysisError;
use crate::features::onset::spectrogram::hann_window;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Mean normalized autocorrelation across analysis windows
///
/// # Arguments
///
/// * `envelope` - Onset envelope values
/// * `window` - Analysis window length in frames (hop is `window / 4`)
///
/// # Returns
///
/// Strength per lag for lags `0..window`. Windows without energy contribute
/// zeros; an all-zero envelope yields an all-zero curve.
///
/// # Errors
///
/// `InvalidInput` for a window shorter than 2 frames, `NumericalError` for
/// non-finite intermediate values.
pub fn mean_tempogram(envelope: &[f32], window: usize) -> Result<Vec<f32>, AnalysisError> {
    if window < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "Tempogram window must be >= 2, got {}",
            window
        )));
    }

    let hop = (window / 4).max(1);
    let taper = hann_window(window);
    let mut planner = FftPlanner::new();

    let mut accum = vec![0.0f64; window];
    let mut n_windows = 0usize;
    let mut segment = vec![0.0f32; window];

    let mut start = 0usize;
    loop {
        for (i, slot) in segment.iter_mut().enumerate() {
            *slot = envelope.get(start + i).copied().unwrap_or(0.0) * taper[i];
        }

        let acf = autocorrelation_fft(&segment, &mut planner)?;
        if acf[0] > EPSILON {
            for (acc, &v) in accum.iter_mut().zip(acf.iter()) {
                *acc += (v / acf[0]) as f64;
            }
        }
        n_windows += 1;

        if start + window >= envelope.len() {
            break;
        }
        start += hop;
    }

    log::debug!(
        "Tempogram: {} windows of {} frames over {} envelope frames",
        n_windows,
        window,
        envelope.len()
    );

    let strength: Vec<f32> = accum
        .iter()
        .map(|&v| (v / n_windows as f64) as f32)
        .collect();

    if strength.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NumericalError(
            "Non-finite tempogram strength".to_string(),
        ));
    }

    Ok(strength)
}
