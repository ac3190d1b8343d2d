//! Audio preprocessing modules
//!
//! Signal normalization ahead of onset extraction:
//! - Channel mixing (multi-channel to mono)
//! - Resampling to the analysis rate

pub mod channel_mixer;
pub mod resample;

use crate::error::AnalysisError;
use crate::io::sample_buffer::{AudioBuffer, DecodedAudio};

/// Bring a mono buffer to the target sample rate
///
/// Returns the buffer unchanged (cloned) when it already runs at `target_rate`.
pub fn prepare_buffer(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer, AnalysisError> {
    if target_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Target sample rate must be > 0".to_string(),
        ));
    }

    if buffer.sample_rate() == target_rate {
        return Ok(buffer.clone());
    }

    let resampled = resample::resample(buffer.samples(), buffer.sample_rate(), target_rate)?;
    AudioBuffer::new(resampled, target_rate)
}

/// Downmix and resample decoder output into an analysis-ready mono buffer
///
/// # Errors
///
/// `InvalidInput` when the decoded audio is empty, has no channels, a zero
/// sample rate, or a trailing partial frame.
pub fn prepare_decoded(decoded: &DecodedAudio, target_rate: u32) -> Result<AudioBuffer, AnalysisError> {
    if decoded.sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Invalid sample rate: 0".to_string(),
        ));
    }

    let mono = channel_mixer::downmix_interleaved(&decoded.samples, decoded.channels)?;
    let buffer = AudioBuffer::new(mono, decoded.sample_rate)?;
    prepare_buffer(&buffer, target_rate)
}
