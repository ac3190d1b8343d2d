//! Performance benchmarks for beat analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cadence_dsp::features::onset::extract_onset_envelope;
use cadence_dsp::{analyze, AnalysisConfig, AudioBuffer};

/// Decaying 1.5 kHz bursts at the given tempo
fn click_track(bpm: f32, seconds: usize, sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let period = (60.0 / bpm * sr) as usize;
    let burst = (0.01 * sr) as usize;
    let mut samples = vec![0.0f32; seconds * sample_rate as usize];
    for start in (0..samples.len()).step_by(period) {
        for i in 0..burst.min(samples.len() - start) {
            let decay = 1.0 - i as f32 / burst as f32;
            samples[start + i] = decay * (2.0 * std::f32::consts::PI * 1500.0 * i as f32 / sr).sin();
        }
    }
    samples
}

fn bench_analyze(c: &mut Criterion) {
    let buffer = AudioBuffer::new(click_track(120.0, 30, 44100), 44100)
        .expect("Failed to build benchmark buffer");
    let config = AnalysisConfig::default();

    c.bench_function("analyze_30s", |b| {
        b.iter(|| {
            let _ = analyze(black_box(&buffer), black_box(&config));
        });
    });

    c.bench_function("onset_envelope_30s", |b| {
        b.iter(|| {
            let _ = extract_onset_envelope(black_box(&buffer), black_box(&config));
        });
    });
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
