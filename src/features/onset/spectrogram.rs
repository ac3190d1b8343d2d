//! Short-time magnitude spectrogram
//!
//! Frames are centered: frame `t` is centered on sample `t * hop_size`, with
//! `frame_size / 2` zeros of padding on both ends of the signal. A signal of
//! `n` samples therefore yields `1 + n / hop_size` frames.
//!
//! [`Stft::magnitudes`] computes any contiguous range of frames, so callers can
//! walk a long signal block by block instead of holding every frame at once.

use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::AnalysisError;

/// Number of centered frames produced for a signal of `n_samples`
pub fn frame_count(n_samples: usize, hop_size: usize) -> usize {
    1 + n_samples / hop_size
}

/// Centered short-time Fourier transform over a borrowed signal
pub struct Stft<'a> {
    samples: &'a [f32],
    frame_size: usize,
    hop_size: usize,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl<'a> Stft<'a> {
    /// Plan the transform
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero hop or a frame smaller than 2 samples
    pub fn new(samples: &'a [f32], frame_size: usize, hop_size: usize) -> Result<Self, AnalysisError> {
        if frame_size < 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "Frame size must be >= 2, got {}",
                frame_size
            )));
        }

        if hop_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "Hop size must be > 0".to_string(),
            ));
        }

        let fft = FftPlanner::<f32>::new().plan_fft_forward(frame_size);
        Ok(Self {
            samples,
            frame_size,
            hop_size,
            window: hann_window(frame_size),
            fft,
        })
    }

    /// Total number of frames
    pub fn n_frames(&self) -> usize {
        frame_count(self.samples.len(), self.hop_size)
    }

    /// Magnitude bins per frame (`frame_size / 2 + 1`)
    pub fn n_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Magnitudes of the frames in `frames`, in order
    ///
    /// The range is clipped to the available frames.
    ///
    /// # Errors
    ///
    /// `NumericalError` if any magnitude is not finite (NaN/inf in the input)
    pub fn magnitudes(&self, frames: Range<usize>) -> Result<Vec<Vec<f32>>, AnalysisError> {
        let end = frames.end.min(self.n_frames());
        let frames = frames.start.min(end)..end;
        let pad = self.frame_size / 2;
        let n_bins = self.n_bins();

        // Each frame is independent; the ordered collect keeps the output identical
        // to a sequential pass.
        let block: Vec<Vec<f32>> = frames
            .clone()
            .into_par_iter()
            .map_init(
                || vec![Complex::new(0.0f32, 0.0f32); self.frame_size],
                |buffer, t| {
                    // Position in the zero-padded signal is `t * hop + i`.
                    let start = t * self.hop_size;
                    for (i, slot) in buffer.iter_mut().enumerate() {
                        let s = (start + i)
                            .checked_sub(pad)
                            .and_then(|j| self.samples.get(j))
                            .copied()
                            .unwrap_or(0.0);
                        *slot = Complex::new(s * self.window[i], 0.0);
                    }
                    self.fft.process(buffer);
                    buffer[..n_bins].iter().map(|c| c.norm()).collect()
                },
            )
            .collect();

        if let Some(bad) = block
            .iter()
            .position(|frame| frame.iter().any(|m| !m.is_finite()))
        {
            return Err(AnalysisError::NumericalError(format!(
                "Non-finite spectral magnitude in frame {} (corrupt or degenerate signal)",
                frames.start + bad
            )));
        }

        Ok(block)
    }
}

/// Symmetric Hann window
pub(crate) fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = (2.0 * std::f64::consts::PI * i as f64) / (n - 1.0);
            (0.5 * (1.0 - x.cos())) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn magnitude_spectrogram(
        samples: &[f32],
        frame_size: usize,
        hop_size: usize,
    ) -> Result<Vec<Vec<f32>>, AnalysisError> {
        let stft = Stft::new(samples, frame_size, hop_size)?;
        stft.magnitudes(0..stft.n_frames())
    }

    #[test]
    fn test_frame_count_centered() {
        assert_eq!(frame_count(0, 512), 1);
        assert_eq!(frame_count(511, 512), 1);
        assert_eq!(frame_count(512, 512), 2);
        assert_eq!(frame_count(44100, 512), 87);
    }

    #[test]
    fn test_spectrogram_shape() {
        let samples = vec![0.0f32; 44100];
        let spec = magnitude_spectrogram(&samples, 2048, 512).unwrap();
        assert_eq!(spec.len(), 87);
        assert!(spec.iter().all(|f| f.len() == 1025));
        assert!(spec.iter().flatten().all(|&m| m == 0.0));
    }

    #[test]
    fn test_spectrogram_sine_peak_bin() {
        // 1 kHz tone: peak bin = 1000 * 2048 / 44100 ≈ 46.4
        let sr = 44100.0f32;
        let samples: Vec<f32> = (0..8192)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sr).sin())
            .collect();
        let spec = magnitude_spectrogram(&samples, 2048, 512).unwrap();
        let frame = &spec[8];
        let peak = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert!((45..=47).contains(&peak), "peak bin {}", peak);
    }

    #[test]
    fn test_blocks_match_full_spectrogram() {
        let samples: Vec<f32> = (0..20_000)
            .map(|i| ((i as f32 * 0.013).sin() * (i % 700) as f32 / 700.0))
            .collect();
        let full = magnitude_spectrogram(&samples, 2048, 512).unwrap();

        let stft = Stft::new(&samples, 2048, 512).unwrap();
        let mut blocks = stft.magnitudes(0..10).unwrap();
        blocks.extend(stft.magnitudes(10..25).unwrap());
        blocks.extend(stft.magnitudes(25..1000).unwrap());
        assert_eq!(blocks, full);
        assert!(stft.magnitudes(full.len()..full.len() + 5).unwrap().is_empty());
    }

    #[test]
    fn test_spectrogram_rejects_nan() {
        let mut samples = vec![0.0f32; 4096];
        samples[1000] = f32::NAN;
        assert!(matches!(
            magnitude_spectrogram(&samples, 2048, 512),
            Err(AnalysisError::NumericalError(_))
        ));
    }

    #[test]
    fn test_spectrogram_invalid_params() {
        assert!(magnitude_spectrogram(&[0.0; 100], 1, 512).is_err());
        assert!(magnitude_spectrogram(&[0.0; 100], 2048, 0).is_err());
    }

    #[test]
    fn test_hann_window_endpoints() {
        let w = hann_window(2048);
        assert!(w[0].abs() < 1e-6);
        assert!(w[2047].abs() < 1e-6);
        assert!((w[1023] - 1.0).abs() < 1e-3);
    }
}
