//! Confidence scoring module
//!
//! Summarizes how trustworthy a report is. Components:
//!
//! 1. **Tempo confidence**: periodicity strength of the chosen tempo lag
//! 2. **Meter confidence**: softmax weight of the winning bar length
//! 3. **Grid stability**: `1 / (1 + CV)` of the inter-beat intervals
//! 4. **Overall confidence**: 40% tempo, 30% meter, 30% grid
//!
//! # Example
//!
//! ```no_run
//! use cadence_dsp::{analyze_report, AnalysisConfig, AudioBuffer};
//! use cadence_dsp::analysis::confidence::compute_confidence;
//!
//! let buffer = AudioBuffer::new(vec![0.0f32; 44100 * 30], 44100)?;
//! let report = analyze_report(&buffer, &AnalysisConfig::default())?;
//! let confidence = compute_confidence(&report);
//!
//! println!("Overall confidence: {:.2}", confidence.overall_confidence);
//! # Ok::<(), cadence_dsp::AnalysisError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::metadata::AnalysisFlag;
use super::result::AnalysisReport;

/// Grid stability below which the grid is flagged as unstable
pub const UNSTABLE_GRID: f32 = 0.3;

/// Analysis confidence scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfidence {
    /// Tempo confidence (0.0-1.0)
    pub tempo_confidence: f32,

    /// Meter confidence (0.0-1.0)
    pub meter_confidence: f32,

    /// Grid stability (0.0-1.0)
    pub grid_stability: f32,

    /// Weighted combination of the three components
    pub overall_confidence: f32,

    /// Report flags plus confidence-derived ones
    pub flags: Vec<AnalysisFlag>,
}

/// Compute confidence scores for an analysis report
///
/// A report without a tempo scores 0 overall.
pub fn compute_confidence(report: &AnalysisReport) -> AnalysisConfidence {
    let tempo_confidence = if report.result.bpm > 0.0 {
        report.metadata.tempo_confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let meter_confidence = (report.metadata.meter_confidence as f32).clamp(0.0, 1.0);
    let grid_stability = grid_stability(&report.result.beats);

    let overall_confidence = if tempo_confidence > 0.0 {
        (tempo_confidence * 0.4 + meter_confidence * 0.3 + grid_stability * 0.3).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut flags = report.metadata.flags.clone();
    if report.result.beats.len() >= 3
        && grid_stability < UNSTABLE_GRID
        && !report.metadata.has_flag(AnalysisFlag::UnstableGrid)
    {
        flags.push(AnalysisFlag::UnstableGrid);
    }

    log::debug!(
        "Confidence scores: tempo={:.3}, meter={:.3}, grid={:.3}, overall={:.3}",
        tempo_confidence,
        meter_confidence,
        grid_stability,
        overall_confidence
    );

    AnalysisConfidence {
        tempo_confidence,
        meter_confidence,
        grid_stability,
        overall_confidence,
        flags,
    }
}

/// Regularity of a beat grid: `1 / (1 + CV)` of its intervals
///
/// Fewer than 3 beats (fewer than 2 intervals) give 0.
pub fn grid_stability(beats: &[f64]) -> f32 {
    if beats.len() < 3 {
        return 0.0;
    }

    let intervals: Vec<f64> = beats.windows(2).map(|w| w[1] - w[0]).collect();
    let mean = intervals.iter().sum::<f64>() / intervals.len() as f64;
    if !(mean > 0.0) {
        return 0.0;
    }

    let variance =
        intervals.iter().map(|i| (i - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
    let cv = variance.sqrt() / mean;

    (1.0 / (1.0 + cv)) as f32
}

impl AnalysisConfidence {
    /// Check if overall confidence is high (>= 0.7)
    pub fn is_high_confidence(&self) -> bool {
        self.overall_confidence >= 0.7
    }

    /// Check if overall confidence is low (< 0.5)
    pub fn is_low_confidence(&self) -> bool {
        self.overall_confidence < 0.5
    }

    /// Human-readable confidence level: "High", "Medium", or "Low"
    pub fn confidence_level(&self) -> &'static str {
        if self.is_high_confidence() {
            "High"
        } else if self.is_low_confidence() {
            "Low"
        } else {
            "Medium"
        }
    }
}
