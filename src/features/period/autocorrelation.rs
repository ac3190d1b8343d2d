//! FFT-accelerated autocorrelation
//!
//! Uses the identity `ACF = IFFT(|FFT(signal)|²)` with zero-padding to at least
//! twice the signal length, so the result is the linear (not circular)
//! autocorrelation.
//!
//! # Reference
//!
//! Ellis, D. P. W., & Pikrakis, A. (2006). Real-time Beat Induction.
//! *Proceedings of the International Conference on Music Information Retrieval*.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::AnalysisError;

/// Compute the autocorrelation of `signal` for lags `0..signal.len()`
///
/// The planner is passed in so repeated calls with the same length reuse the
/// cached FFT plans.
///
/// # Errors
///
/// `NumericalError` if the transform produces non-finite values.
pub fn autocorrelation_fft(
    signal: &[f32],
    planner: &mut FftPlanner<f32>,
) -> Result<Vec<f32>, AnalysisError> {
    let n = signal.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    // FFT size: next power of 2 >= 2*n (for zero-padding)
    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = Complex::new(x.norm_sqr(), 0.0);
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / (fft_size as f32);
    let acf: Vec<f32> = buffer[..n]
        .iter()
        // Inputs here are non-negative, so negative values are FFT round-off.
        .map(|x| (x.re * scale).max(0.0))
        .collect();

    if acf.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NumericalError(
            "Non-finite autocorrelation value".to_string(),
        ));
    }

    Ok(acf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_acf(signal: &[f32]) -> Vec<f32> {
        (0..signal.len())
            .map(|lag| {
                signal
                    .iter()
                    .zip(signal[lag..].iter())
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_matches_direct_computation() {
        let signal = vec![1.0, 0.0, 0.5, 0.0, 1.0, 0.25, 0.0, 0.75];
        let fast = autocorrelation_fft(&signal, &mut FftPlanner::new()).unwrap();
        let slow = direct_acf(&signal);
        assert_eq!(fast.len(), slow.len());
        for (a, b) in fast.iter().zip(slow.iter()) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_periodic_signal_peaks_at_period() {
        let mut signal = vec![0.0f32; 64];
        for i in (0..64).step_by(8) {
            signal[i] = 1.0;
        }
        let acf = autocorrelation_fft(&signal, &mut FftPlanner::new()).unwrap();
        assert!(acf[8] > acf[4]);
        assert!(acf[8] > acf[7]);
        assert!(acf[0] >= acf[8]);
    }

    #[test]
    fn test_empty_signal() {
        assert!(autocorrelation_fft(&[], &mut FftPlanner::new())
            .unwrap()
            .is_empty());
    }
}
