//! Analysis result types and assembly

use serde::{Deserialize, Serialize};

use super::metadata::AnalysisMetadata;
use crate::config::AnalysisConfig;
use crate::features::beat_tracking::BeatSequence;
use crate::features::downbeat::MeterAssignment;

/// Tempo, beat and downbeat times of a track
///
/// Serializes as `{"bpm": 120.0, "beats": [...], "downbeats": [...]}`.
///
/// # Example
///
/// ```
/// use cadence_dsp::AnalysisResult;
///
/// let result = AnalysisResult {
///     bpm: 120.0,
///     beats: vec![0.5, 1.0, 1.5],
///     downbeats: vec![0.5],
/// };
/// assert!(result.downbeats.iter().all(|d| result.beats.contains(d)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Tempo in beats per minute; 0 when no tempo was found
    pub bpm: f64,

    /// Beat times in seconds, strictly increasing
    pub beats: Vec<f64>,

    /// Downbeat (bar start) times in seconds, a subset of `beats`
    pub downbeats: Vec<f64>,
}

/// Result plus diagnostics about how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The analysis result
    pub result: AnalysisResult,

    /// Diagnostics; never affects `result`
    pub metadata: AnalysisMetadata,
}

/// Round `value` to `decimals` decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// Package pipeline outputs into an [`AnalysisResult`]
///
/// Downbeats are the beats assigned to bar position 1; without a meter
/// assignment there are none.
pub fn assemble(
    bpm: f32,
    beats: &BeatSequence,
    meter: Option<&MeterAssignment>,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let beat_times: Vec<f64> = beats
        .times
        .iter()
        .map(|&t| round_to(t, config.time_precision))
        .collect();

    let downbeats = match meter {
        Some(meter) => meter
            .downbeat_indices()
            .into_iter()
            .filter_map(|i| beat_times.get(i).copied())
            .collect(),
        None => Vec::new(),
    };

    AnalysisResult {
        bpm: round_to(bpm as f64, config.bpm_precision),
        beats: beat_times,
        downbeats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(120.126, 2), 120.13);
        assert_eq!(round_to(0.1234567, 6), 0.123457);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(120.13f32 as f64, 2), 120.13);
    }

    #[test]
    fn test_assemble_with_meter() {
        let beats = BeatSequence {
            frames: vec![43, 86, 129, 172, 215],
            times: vec![0.49923, 0.99846, 1.4976963, 1.99692, 2.49615],
            strengths: vec![1.0; 5],
        };
        let meter = MeterAssignment {
            beats_per_bar: 4,
            positions: vec![1, 2, 3, 4, 1],
            log_likelihood: -1.0,
            confidence: 0.9,
        };
        let result = assemble(120.004, &beats, Some(&meter), &AnalysisConfig::default());
        assert_eq!(result.bpm, 120.0);
        assert_eq!(result.beats[2], 1.497696);
        assert_eq!(result.downbeats, vec![0.49923, 2.49615]);
    }

    #[test]
    fn test_assemble_without_meter() {
        let beats = BeatSequence {
            frames: vec![10, 53],
            times: vec![0.116, 0.615],
            strengths: vec![1.0, 1.0],
        };
        let result = assemble(120.0, &beats, None, &AnalysisConfig::default());
        assert_eq!(result.beats.len(), 2);
        assert!(result.downbeats.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let result = AnalysisResult {
            bpm: 120.5,
            beats: vec![0.5, 1.0],
            downbeats: vec![0.5],
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"bpm":120.5,"beats":[0.5,1.0],"downbeats":[0.5]}"#);
    }
}
