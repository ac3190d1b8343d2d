//! Onset envelope extraction
//!
//! Turns a waveform into a frame-rate onset-strength curve:
//! - Centered STFT magnitude spectrogram
//! - Half-wave rectified spectral flux
//! - Local-mean detrending and scale normalization

pub mod spectral_flux;
pub mod spectrogram;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::io::sample_buffer::AudioBuffer;

/// Spectrogram frames held in memory at once while computing flux
pub const FLUX_BLOCK_FRAMES: usize = 256;

/// Onset strength curve, one non-negative value per analysis frame
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetEnvelope {
    values: Vec<f32>,
    frame_rate: f32,
}

impl OnsetEnvelope {
    /// Wrap precomputed onset strengths
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a non-positive frame rate; `NumericalError` for
    /// negative or non-finite values.
    pub fn new(values: Vec<f32>, frame_rate: f32) -> Result<Self, AnalysisError> {
        if !(frame_rate > 0.0) || !frame_rate.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid envelope frame rate: {}",
                frame_rate
            )));
        }

        if let Some(idx) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(AnalysisError::NumericalError(format!(
                "Invalid onset strength {} at frame {}",
                values[idx], idx
            )));
        }

        Ok(Self { values, frame_rate })
    }

    /// Onset strength per frame
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no frames
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if the envelope carries no rhythmic content at all
    pub fn is_silent(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Time of a frame centre in seconds
    pub fn frame_to_seconds(&self, frame: usize) -> f64 {
        frame as f64 / self.frame_rate as f64
    }
}

/// Extract the onset envelope of a mono buffer
///
/// The buffer is analysed at its own sample rate; the Signal Normalizer is
/// expected to have brought it to the configured rate already. The spectrogram
/// is walked in blocks of [`FLUX_BLOCK_FRAMES`] frames, so memory stays bounded
/// by one block regardless of track length.
///
/// # Errors
///
/// - `InvalidInput` for invalid STFT parameters
/// - `NumericalError` if the signal produces non-finite spectra
pub fn extract_onset_envelope(
    buffer: &AudioBuffer,
    config: &AnalysisConfig,
) -> Result<OnsetEnvelope, AnalysisError> {
    let stft = spectrogram::Stft::new(buffer.samples(), config.frame_size, config.hop_size)?;
    let frame_rate = buffer.sample_rate() as f32 / config.hop_size as f32;
    let n_frames = stft.n_frames();

    log::debug!(
        "Computing spectral flux: {} samples, frame={}, hop={}, {} frames",
        buffer.len(),
        config.frame_size,
        config.hop_size,
        n_frames
    );

    let mut flux = Vec::with_capacity(n_frames);
    let mut previous: Option<Vec<f32>> = None;
    let mut start = 0;
    while start < n_frames {
        let end = (start + FLUX_BLOCK_FRAMES).min(n_frames);
        let mut block = stft.magnitudes(start..end)?;
        flux.extend(spectral_flux::spectral_flux(previous.as_deref(), &block)?);
        previous = block.pop();
        start = end;
    }

    let values = spectral_flux::normalize_flux(&flux, config.onset_mean_window);

    log::debug!(
        "Onset envelope: {} frames at {:.2} fps, peak={:.3}",
        values.len(),
        frame_rate,
        values.iter().copied().fold(0.0f32, f32::max)
    );

    OnsetEnvelope::new(values, frame_rate)
}
