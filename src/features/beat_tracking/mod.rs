//! Beat tracking
//!
//! Place individual beats on the onset envelope given a global tempo:
//! - Dynamic programming with a log-ratio tempo-deviation penalty
//! - Weak-edge trimming

pub mod dynamic_programming;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::onset::OnsetEnvelope;
use crate::features::period::TempoEstimate;

use dynamic_programming::DpParams;

/// Ordered beat positions of a track
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BeatSequence {
    /// Beat frames, strictly increasing
    pub frames: Vec<usize>,

    /// Beat times in seconds (`frame / frame_rate`)
    pub times: Vec<f64>,

    /// Onset strength at each beat frame
    pub strengths: Vec<f32>,
}

impl BeatSequence {
    /// Number of beats
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if no beats were found
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Track beats on an onset envelope
///
/// An estimate without a tempo, or an envelope shorter than one beat period,
/// yields an empty sequence.
///
/// # Errors
///
/// `InvalidInput` if the tempo or tracker parameters are unusable.
pub fn track_beats(
    envelope: &OnsetEnvelope,
    tempo: &TempoEstimate,
    config: &AnalysisConfig,
) -> Result<BeatSequence, AnalysisError> {
    if !tempo.is_some() {
        log::debug!("No tempo, skipping beat tracking");
        return Ok(BeatSequence::default());
    }

    if !(tempo.period_frames > 0.0) || !tempo.period_frames.is_finite() {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid beat period: {} frames at {} BPM",
            tempo.period_frames, tempo.bpm
        )));
    }

    if !(config.max_bpm > 0.0) || !(config.beat_tolerance >= 0.0) || !(config.beat_tightness >= 0.0)
    {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid beat tracker parameters: max_bpm={}, tolerance={}, tightness={}",
            config.max_bpm, config.beat_tolerance, config.beat_tightness
        )));
    }

    let fps = envelope.frame_rate() as f64;
    let period = tempo.period_frames as f64;

    if (envelope.len() as f64) < period {
        log::debug!(
            "Envelope of {} frames is shorter than one period ({:.2} frames)",
            envelope.len(),
            period
        );
        return Ok(BeatSequence::default());
    }

    let params = DpParams {
        period,
        tolerance: config.beat_tolerance as f64,
        tightness: config.beat_tightness as f64,
        min_interval: ((60.0 * fps / config.max_bpm as f64).floor() as usize).max(1),
    };

    let onset = envelope.values();
    let mut frames = dynamic_programming::track_beat_frames(onset, &params);
    if config.trim_beats {
        let before = frames.len();
        frames = dynamic_programming::trim_weak_beats(onset, &frames);
        if frames.len() != before {
            log::debug!("Trimmed {} weak edge beats", before - frames.len());
        }
    }

    let times = frames.iter().map(|&f| envelope.frame_to_seconds(f)).collect();
    let strengths = frames.iter().map(|&f| onset[f]).collect();

    log::debug!(
        "Beat tracking: {} beats at period {:.2} frames",
        frames.len(),
        period
    );

    Ok(BeatSequence {
        frames,
        times,
        strengths,
    })
}
