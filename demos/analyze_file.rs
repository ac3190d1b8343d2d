//! Example: Analyze a single audio file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- [--config config.json] [--report] <file>
//!
//! Prints `{"bpm": ..., "beats": [...], "downbeats": [...]}` on stdout. With
//! `--report` the metadata and confidence scores are included as well.

use std::env;

use cadence_dsp::analysis::confidence::compute_confidence;
use cadence_dsp::io::decoder::decode_file;
use cadence_dsp::{analyze_decoded, AnalysisConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let mut config_path: Option<String> = None;
    let mut report = false;
    let mut path: Option<String> = None;

    while let Some(a) = args.next() {
        match a.as_str() {
            "--config" => config_path = Some(args.next().ok_or("--config requires a path")?),
            "--report" => report = true,
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_file [--config config.json] [--report] <file>\n\
                     \n\
                     --config F  JSON file with analysis parameters (missing keys use defaults)\n\
                     --report    Include metadata and confidence scores\n"
                );
                return Ok(());
            }
            _ => path = Some(a),
        }
    }

    let path = match path {
        Some(p) => p,
        None => {
            eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
            std::process::exit(2);
        }
    };

    let config: AnalysisConfig = match config_path {
        Some(p) => serde_json::from_str(&std::fs::read_to_string(p)?)?,
        None => AnalysisConfig::default(),
    };

    let decoded = decode_file(&path)?;
    let analysis = analyze_decoded(&decoded, &config)?;

    if report {
        let confidence = compute_confidence(&analysis);
        let out = serde_json::json!({
            "result": analysis.result,
            "metadata": analysis.metadata,
            "confidence": confidence,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", serde_json::to_string(&analysis.result)?);
    }

    eprintln!(
        "{}: {:.2} BPM, {} beats, {} downbeats ({:.1} ms)",
        path,
        analysis.result.bpm,
        analysis.result.beats.len(),
        analysis.result.downbeats.len(),
        analysis.metadata.processing_time_ms
    );

    Ok(())
}
