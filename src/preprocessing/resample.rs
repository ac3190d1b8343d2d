//! Sample-rate conversion to the analysis rate
//!
//! Band-limited sinc interpolation via `rubato`. The input is fed in fixed-size
//! chunks and the resampler is flushed afterwards, so the output is aligned with
//! the input (the filter delay is removed) and has exactly
//! `round(len * to_rate / from_rate)` samples.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AnalysisError;

/// Input frames handed to the resampler per call
const CHUNK_FRAMES: usize = 1024;

/// Sinc kernel length in input samples
const SINC_LEN: usize = 128;

/// Resample a mono signal from `from_rate` to `to_rate`
///
/// Equal rates and empty input return a copy of the input.
///
/// # Errors
///
/// `InvalidInput` when either rate is zero or the ratio is unsupported,
/// `ProcessingError` if resampling itself fails.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AnalysisError> {
    if from_rate == 0 || to_rate == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid resampling rates: {} Hz -> {} Hz",
            from_rate, to_rate
        )));
    }

    if input.is_empty() || from_rate == to_rate {
        return Ok(input.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: SINC_LEN,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, CHUNK_FRAMES, 1)?;

    let delay = resampler.output_delay();
    let expected = ((input.len() as f64 * ratio).round() as usize).max(1);
    let needed = delay + expected;

    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz ({} output samples, delay {})",
        input.len(),
        from_rate,
        to_rate,
        expected,
        delay
    );

    let mut output: Vec<f32> = Vec::with_capacity(needed + CHUNK_FRAMES);
    let mut chunks = input.chunks_exact(CHUNK_FRAMES);
    for chunk in &mut chunks {
        let wave = [chunk];
        let out = resampler.process(&wave[..], None)?;
        append_mono(&mut output, out);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let wave = [tail];
        let out = resampler.process_partial(Some(&wave[..]), None)?;
        append_mono(&mut output, out);
    }

    // Flush the samples still held back by the filter delay.
    while output.len() < needed {
        let before = output.len();
        let out = resampler.process_partial(None::<&[&[f32]]>, None)?;
        append_mono(&mut output, out);
        if output.len() == before {
            break;
        }
    }

    let mut resampled: Vec<f32> = output.into_iter().skip(delay).take(expected).collect();
    resampled.resize(expected, 0.0);
    Ok(resampled)
}

fn append_mono(output: &mut Vec<f32>, channels: Vec<Vec<f32>>) {
    if let Some(mono) = channels.into_iter().next() {
        output.extend(mono);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_crossings(signal: &[f32]) -> usize {
        signal
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count()
    }

    #[test]
    fn test_resample_same_rate_is_copy() {
        let input: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let output = resample(&input, 44100, 44100).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_resample_output_length() {
        let output = resample(&vec![0.0f32; 48000], 48000, 44100).unwrap();
        assert_eq!(output.len(), 44100);

        let output = resample(&vec![0.0f32; 22050], 22050, 44100).unwrap();
        assert_eq!(output.len(), 44100);

        // Shorter than one chunk.
        let output = resample(&vec![0.0f32; 480], 48000, 44100).unwrap();
        assert_eq!(output.len(), 441);

        let output = resample(&[0.3], 48000, 44100).unwrap();
        assert_eq!(output.len(), 1);
    }

    #[test]
    fn test_resample_preserves_dc() {
        let input = vec![0.5f32; 4800];
        let output = resample(&input, 48000, 44100).unwrap();
        // The kernel sees the zero padding within half a kernel of each edge.
        for (i, &s) in output.iter().enumerate().take(output.len() - 200).skip(200) {
            assert!((s - 0.5).abs() < 5e-3, "sample {} drifted: {}", i, s);
        }
    }

    #[test]
    fn test_resample_sine_keeps_frequency() {
        // 1 kHz tone at 48 kHz resampled to 44.1 kHz stays a 1 kHz tone.
        let from = 48000u32;
        let to = 44100u32;
        let input: Vec<f32> = (0..from as usize)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / from as f32).sin())
            .collect();
        let output = resample(&input, from, to).unwrap();
        assert_eq!(output.len(), to as usize);

        // 42000 samples at 44.1 kHz hold ~952 periods, two crossings each.
        let crossings = zero_crossings(&output[1000..43000]);
        assert!(
            (1900..=1910).contains(&crossings),
            "{} zero crossings",
            crossings
        );

        let peak = output[1000..43000]
            .iter()
            .fold(0.0f32, |m, &v| m.max(v.abs()));
        assert!((peak - 1.0).abs() < 0.02, "peak {}", peak);
    }

    #[test]
    fn test_resample_invalid_rates() {
        assert!(matches!(
            resample(&[0.0; 10], 0, 44100),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(resample(&[0.0; 10], 44100, 0).is_err());
    }
}
