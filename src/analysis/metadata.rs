//! Analysis metadata structures

use serde::{Deserialize, Serialize};

/// Meter confidence below which the meter is reported as uncertain
pub const LOW_METER_CONFIDENCE: f64 = 0.6;

/// Conditions worth surfacing alongside a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisFlag {
    /// The onset envelope carried no energy at all
    Silent,
    /// Input too short to hold the minimum tempo lag or one beat period
    TooShort,
    /// Several tempo candidates were equally strong
    AmbiguousTempo,
    /// Meter could not be inferred, or the winning bar length was not clear
    LowMeterConfidence,
    /// Inter-beat intervals vary strongly
    UnstableGrid,
}

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Input duration in seconds
    pub duration_seconds: f64,

    /// Sample rate the analysis ran at, in Hz
    pub sample_rate: u32,

    /// Onset envelope frames per second
    pub frame_rate: f32,

    /// Periodicity strength of the chosen tempo (0.0-1.0)
    pub tempo_confidence: f32,

    /// Inferred beats per bar, if a meter was inferred
    pub beats_per_bar: Option<usize>,

    /// Softmax weight of the winning meter (0.0-1.0), 0 without a meter
    pub meter_confidence: f64,

    /// Analysis flags
    pub flags: Vec<AnalysisFlag>,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,
}

impl Default for AnalysisMetadata {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: 0,
            frame_rate: 0.0,
            tempo_confidence: 0.0,
            beats_per_bar: None,
            meter_confidence: 0.0,
            flags: vec![],
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl AnalysisMetadata {
    /// True if `flag` was raised
    pub fn has_flag(&self, flag: AnalysisFlag) -> bool {
        self.flags.contains(&flag)
    }
}
