//! Configuration parameters for beat analysis

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Analysis configuration parameters
///
/// Every field has a default; a partial JSON/TOML document deserializes into a
/// complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Preprocessing
    /// Sample rate the signal is resampled to before analysis (default: 44100)
    pub target_sample_rate: u32,

    // STFT parameters
    /// Frame size for STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size for STFT (default: 512)
    pub hop_size: usize,

    /// Width of the moving average subtracted from the flux, in frames (default: 16)
    pub onset_mean_window: usize,

    // Tempo estimation
    /// Minimum BPM to consider (default: 40.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 300.0)
    pub max_bpm: f32,

    /// Tempogram analysis window in onset frames (default: 384, ~4.5 s at 44.1 kHz)
    pub tempogram_window: usize,

    /// Relative strength tolerance under which tempo candidates count as tied (default: 0.1)
    pub tempo_tie_tolerance: f32,

    /// Tempo range preferred when breaking ties between octave candidates (default: 90-140)
    pub preferred_bpm_range: (f32, f32),

    // Beat tracking
    /// Allowed relative deviation of an inter-beat interval from the period (default: 0.3)
    pub beat_tolerance: f32,

    /// Weight of the log-ratio deviation penalty (default: 100.0)
    pub beat_tightness: f32,

    /// Drop weak leading/trailing beats (default: true)
    pub trim_beats: bool,

    // Meter inference
    /// Candidate bar lengths in beats (default: [3, 4])
    pub bar_lengths: Vec<usize>,

    /// Bar length favoured by the meter prior (default: 4)
    pub preferred_bar_length: usize,

    /// Prior probability mass of `preferred_bar_length` (default: 0.7)
    pub preferred_meter_weight: f32,

    /// Probability of an irregular bar-position transition (default: 0.05)
    pub anomaly_probability: f32,

    /// Neighbourhood (in frames) searched for a beat's accent strength (default: 2)
    pub accent_radius: usize,

    // Output
    /// Decimal places kept for the BPM (default: 2)
    pub bpm_precision: u32,

    /// Decimal places kept for beat and downbeat timestamps (default: 6)
    pub time_precision: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 44100,
            frame_size: 2048,
            hop_size: 512,
            onset_mean_window: 16,
            min_bpm: 40.0,
            max_bpm: 300.0,
            tempogram_window: 384,
            tempo_tie_tolerance: 0.1,
            preferred_bpm_range: (90.0, 140.0),
            beat_tolerance: 0.3,
            beat_tightness: 100.0,
            trim_beats: true,
            bar_lengths: vec![3, 4],
            preferred_bar_length: 4,
            preferred_meter_weight: 0.7,
            anomaly_probability: 0.05,
            accent_radius: 2,
            bpm_precision: 2,
            time_precision: 6,
        }
    }
}

impl AnalysisConfig {
    /// Legacy mode: every track is assumed to be in 4/4
    pub fn fixed_four_four() -> Self {
        Self {
            bar_lengths: vec![4],
            ..Self::default()
        }
    }

    /// Check that the parameters describe a usable analysis
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.target_sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Target sample rate must be > 0".to_string(),
            ));
        }

        if self.frame_size < 2 || self.hop_size == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid STFT parameters: frame_size={}, hop_size={}",
                self.frame_size, self.hop_size
            )));
        }

        if !(self.min_bpm > 0.0) || !(self.max_bpm > self.min_bpm) || !self.max_bpm.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid BPM range: [{:.1}, {:.1}]",
                self.min_bpm, self.max_bpm
            )));
        }

        if self.tempogram_window < 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "Tempogram window too small: {}",
                self.tempogram_window
            )));
        }

        if !(0.0..1.0).contains(&self.tempo_tie_tolerance) {
            return Err(AnalysisError::InvalidInput(format!(
                "Tempo tie tolerance must be in [0, 1), got {}",
                self.tempo_tie_tolerance
            )));
        }

        if !(0.0..1.0).contains(&self.beat_tolerance) || self.beat_tightness < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "Invalid beat tracking parameters: tolerance={}, tightness={}",
                self.beat_tolerance, self.beat_tightness
            )));
        }

        if self.bar_lengths.is_empty() || self.bar_lengths.iter().any(|&l| l < 2) {
            return Err(AnalysisError::InvalidInput(format!(
                "Bar lengths must be non-empty and >= 2, got {:?}",
                self.bar_lengths
            )));
        }

        if !(self.preferred_meter_weight > 0.0 && self.preferred_meter_weight < 1.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "Preferred meter weight must be in (0, 1), got {}",
                self.preferred_meter_weight
            )));
        }

        if !(self.anomaly_probability > 0.0 && self.anomaly_probability < 1.0) {
            return Err(AnalysisError::InvalidInput(format!(
                "Anomaly probability must be in (0, 1), got {}",
                self.anomaly_probability
            )));
        }

        if self.bpm_precision > 9 || self.time_precision > 9 {
            return Err(AnalysisError::InvalidInput(format!(
                "Rounding precision too high: bpm={}, time={}",
                self.bpm_precision, self.time_precision
            )));
        }

        // Rounded beat times must stay distinct at the fastest allowed tempo.
        let fps = self.frame_rate() as f64;
        let min_spacing = ((60.0 * fps / self.max_bpm as f64).floor()).max(1.0) / fps;
        let resolution = 10f64.powi(-(self.time_precision as i32));
        if resolution >= min_spacing {
            return Err(AnalysisError::InvalidInput(format!(
                "Time precision {} ({}s) is coarser than the minimum beat spacing {:.4}s at {:.1} BPM",
                self.time_precision, resolution, min_spacing, self.max_bpm
            )));
        }

        Ok(())
    }

    /// Onset envelope frame rate (frames per second) at the target sample rate
    pub fn frame_rate(&self) -> f32 {
        self.target_sample_rate as f32 / self.hop_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
        assert!(AnalysisConfig::fixed_four_four().validate().is_ok());
    }

    #[test]
    fn test_invalid_bpm_range() {
        let config = AnalysisConfig {
            min_bpm: 200.0,
            max_bpm: 100.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_bar_lengths() {
        let config = AnalysisConfig {
            bar_lengths: vec![],
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            bar_lengths: vec![1, 4],
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_time_precision_must_resolve_fastest_beats() {
        // 300 BPM at ~86 fps is 17 frames, about 0.197 s between beats.
        let config = AnalysisConfig {
            time_precision: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidInput(_))
        ));

        let config = AnalysisConfig {
            time_precision: 1,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = AnalysisConfig {
            time_precision: 0,
            max_bpm: 50.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frame_rate() {
        let config = AnalysisConfig::default();
        assert!((config.frame_rate() - 86.1328).abs() < 1e-3);
    }
}
