//! Example: Analyze multiple audio files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files (batch-level). Each file analysis is still single-threaded.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use std::env;
use std::time::Instant;

use rayon::prelude::*;

use cadence_dsp::analysis::confidence::compute_confidence;
use cadence_dsp::io::decoder::decode_file;
use cadence_dsp::{analyze_decoded, AnalysisConfig, AnalysisReport};

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn percentile(mut xs: Vec<f32>, p: f32) -> Option<f32> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    let idx = ((xs.len() - 1) as f32 * p.clamp(0.0, 1.0)).round() as usize;
    Some(xs[idx.min(xs.len() - 1)])
}

fn analyze_path(path: &str, config: &AnalysisConfig) -> Result<AnalysisReport, String> {
    let decoded = decode_file(path).map_err(|e| format!("decode failed: {e}"))?;
    analyze_decoded(&decoded, config).map_err(|e| format!("analysis failed: {e}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.next() {
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args.next().ok_or("--jobs requires a value")?.parse::<usize>()?;
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let config = AnalysisConfig::default();

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<(String, Result<AnalysisReport, String>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| (path.clone(), analyze_path(path, &config)))
            .collect()
    });

    for (idx, (path, out)) in outs.iter().enumerate() {
        match (out, json) {
            (Ok(report), true) => {
                let line = serde_json::json!({
                    "file": path,
                    "bpm": report.result.bpm,
                    "beats": report.result.beats,
                    "downbeats": report.result.downbeats,
                    "beats_per_bar": report.metadata.beats_per_bar,
                    "confidence": compute_confidence(report).overall_confidence,
                    "processing_time_ms": report.metadata.processing_time_ms,
                });
                println!("{}", line);
            }
            (Err(e), true) => {
                println!("{}", serde_json::json!({ "file": path, "error": e }));
            }
            (Ok(report), false) => {
                let confidence = compute_confidence(report);
                println!(
                    "[{}/{}] {}: BPM={:.2} beats={} downbeats={} meter={} (conf={:.3} {}) time={:.2}ms",
                    idx + 1,
                    outs.len(),
                    path,
                    report.result.bpm,
                    report.result.beats.len(),
                    report.result.downbeats.len(),
                    report
                        .metadata
                        .beats_per_bar
                        .map_or("-".to_string(), |l| l.to_string()),
                    confidence.overall_confidence,
                    confidence.confidence_level(),
                    report.metadata.processing_time_ms
                );
            }
            (Err(e), false) => {
                println!("[{}/{}] {}: ERROR: {}", idx + 1, outs.len(), path, e);
            }
        }
    }

    let ok_times: Vec<f32> = outs
        .iter()
        .filter_map(|(_, o)| o.as_ref().ok())
        .map(|r| r.metadata.processing_time_ms)
        .collect();
    let wall_ms = t0.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok_times.len(),
        outs.len(),
        wall_ms
    );
    if !ok_times.is_empty() {
        let mean = ok_times.iter().sum::<f32>() / ok_times.len() as f32;
        let p50 = percentile(ok_times.clone(), 0.50).unwrap_or(mean);
        let p90 = percentile(ok_times.clone(), 0.90).unwrap_or(mean);
        eprintln!(
            "processing_time_ms: mean={:.2} p50={:.2} p90={:.2}",
            mean, p50, p90
        );
    }

    Ok(())
}
