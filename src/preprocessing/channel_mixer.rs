//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::AnalysisError;

/// Downmix interleaved multi-channel audio to mono by averaging channels
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (`[c0, c1, ..., c0, c1, ...]`)
/// * `channels` - Number of channels
///
/// # Returns
///
/// Mono samples, one per input frame
///
/// # Errors
///
/// `InvalidInput` when `channels` is zero or the buffer ends in a partial frame.
pub fn downmix_interleaved(
    interleaved: &[f32],
    channels: usize,
) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }

    if interleaved.len() % channels != 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Interleaved buffer of {} samples is not a whole number of {}-channel frames",
            interleaved.len(),
            channels
        )));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!("Downmixing {} channels to mono", channels);

    let scale = 1.0 / channels as f32;
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_stereo_average() {
        let stereo = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix_interleaved(&stereo, 2).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let mono = downmix_interleaved(&[0.1, 0.2, 0.3], 1).unwrap();
        assert_eq!(mono, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_downmix_partial_frame() {
        assert!(downmix_interleaved(&[0.1, 0.2, 0.3], 2).is_err());
        assert!(downmix_interleaved(&[0.1], 0).is_err());
    }
}
