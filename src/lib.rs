//! # Cadence DSP
//!
//! A beat and downbeat tracking engine: estimates the tempo of a piece of
//! music, the time of every beat, and which beats start a bar.
//!
//! ## Features
//!
//! - **Onset Envelope**: Spectral flux over a centered STFT
//! - **Tempo Estimation**: Windowed autocorrelation tempogram with octave-aware tie-breaking
//! - **Beat Tracking**: Dynamic programming with a log-ratio tempo penalty
//! - **Downbeats**: Viterbi inference over bar positions for 3/4 and 4/4
//!
//! ## Quick Start
//!
//! ```no_run
//! use cadence_dsp::{analyze, AnalysisConfig, AudioBuffer};
//!
//! // Mono f32 samples, normalized to [-1.0, 1.0]
//! let samples: Vec<f32> = vec![0.0; 44100 * 10];
//! let buffer = AudioBuffer::new(samples, 44100)?;
//!
//! let result = analyze(&buffer, &AnalysisConfig::default())?;
//!
//! println!("BPM: {:.2}", result.bpm);
//! println!("{} beats, {} downbeats", result.beats.len(), result.downbeats.len());
//! # Ok::<(), cadence_dsp::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! The analysis pipeline is strictly sequential:
//!
//! ```text
//! Audio Input → Preprocessing → Onset Envelope → Tempo → Beats → Downbeats → Output
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

use std::time::Instant;

// Re-export main types
pub use analysis::metadata::{AnalysisFlag, AnalysisMetadata};
pub use analysis::result::{AnalysisReport, AnalysisResult};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, ErrorKind};
pub use io::sample_buffer::{AudioBuffer, DecodedAudio};

use analysis::confidence::UNSTABLE_GRID;
use analysis::metadata::LOW_METER_CONFIDENCE;

/// Main analysis function
///
/// Estimates tempo, beats and downbeats of a mono buffer.
///
/// # Arguments
///
/// * `buffer` - Mono audio; resampled to `config.target_sample_rate` if needed
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `AnalysisResult` with BPM and beat/downbeat times in seconds. Silence and
/// inputs too short to contain a beat give `bpm = 0` and empty sequences.
///
/// # Errors
///
/// - `InvalidInput` for an invalid configuration
/// - `NumericalError` / `ProcessingError` if a stage cannot produce finite
///   values (e.g. NaN samples)
///
/// # Example
///
/// ```no_run
/// use cadence_dsp::{analyze, AnalysisConfig, AudioBuffer};
///
/// let buffer = AudioBuffer::new(vec![0.0f32; 44100 * 30], 44100)?;
/// let result = analyze(&buffer, &AnalysisConfig::default())?;
/// assert_eq!(result.bpm, 0.0);
/// # Ok::<(), cadence_dsp::AnalysisError>(())
/// ```
pub fn analyze(
    buffer: &AudioBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_report(buffer, config).map(|report| report.result)
}

/// Analyze a mono buffer and return the result with metadata
///
/// # Errors
///
/// Same as [`analyze`].
pub fn analyze_report(
    buffer: &AudioBuffer,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let start_time = Instant::now();
    config.validate()?;

    log::debug!(
        "Starting analysis: {} samples at {} Hz",
        buffer.len(),
        buffer.sample_rate()
    );

    let prepared = preprocessing::prepare_buffer(buffer, config.target_sample_rate)?;
    run_pipeline(
        &prepared,
        buffer.duration_seconds() as f64,
        config,
        start_time,
    )
}

/// Analyze decoder output of any channel count and sample rate
///
/// Channels are averaged to mono before analysis.
///
/// # Errors
///
/// `InvalidInput` for empty audio, zero channels, a zero sample rate or a
/// trailing partial frame; otherwise same as [`analyze`].
pub fn analyze_decoded(
    decoded: &DecodedAudio,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    let start_time = Instant::now();
    config.validate()?;

    log::debug!(
        "Starting analysis: {} frames x {} channels at {} Hz",
        decoded.frames(),
        decoded.channels,
        decoded.sample_rate
    );

    let prepared = preprocessing::prepare_decoded(decoded, config.target_sample_rate)?;
    let duration = decoded.frames() as f64 / decoded.sample_rate as f64;
    run_pipeline(&prepared, duration, config, start_time)
}

fn run_pipeline(
    buffer: &AudioBuffer,
    duration_seconds: f64,
    config: &AnalysisConfig,
    start_time: Instant,
) -> Result<AnalysisReport, AnalysisError> {
    let envelope = features::onset::extract_onset_envelope(buffer, config)?;
    let tempo = features::period::estimate_tempo(&envelope, config)?;
    let beats = features::beat_tracking::track_beats(&envelope, &tempo, config)?;
    let meter = features::downbeat::infer_meter(&beats, &envelope, config)?;

    let result = analysis::result::assemble(tempo.bpm, &beats, meter.as_ref(), config);

    let silent = envelope.is_silent();
    let mut flags = Vec::new();
    if silent {
        flags.push(AnalysisFlag::Silent);
    } else if beats.is_empty() {
        flags.push(AnalysisFlag::TooShort);
    }
    if tempo.ambiguous {
        flags.push(AnalysisFlag::AmbiguousTempo);
    }
    if meter
        .as_ref()
        .map_or(true, |m| m.confidence < LOW_METER_CONFIDENCE)
    {
        flags.push(AnalysisFlag::LowMeterConfidence);
    }
    if result.beats.len() >= 3
        && analysis::confidence::grid_stability(&result.beats) < UNSTABLE_GRID
    {
        flags.push(AnalysisFlag::UnstableGrid);
    }

    if !flags.is_empty() {
        log::debug!("Analysis flags: {:?}", flags);
    }

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Analysis complete: {:.2} BPM, {} beats, {} downbeats in {:.1} ms",
        result.bpm,
        result.beats.len(),
        result.downbeats.len(),
        processing_time_ms
    );

    Ok(AnalysisReport {
        result,
        metadata: AnalysisMetadata {
            duration_seconds,
            sample_rate: buffer.sample_rate(),
            frame_rate: envelope.frame_rate(),
            tempo_confidence: tempo.confidence,
            beats_per_bar: meter.as_ref().map(|m| m.beats_per_bar),
            meter_confidence: meter.as_ref().map_or(0.0, |m| m.confidence),
            flags,
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}
