//! Dynamic-programming beat tracker
//!
//! Finds the beat sequence maximizing total onset strength while penalizing
//! inter-beat intervals that deviate from the tempo period:
//!
//! ```text
//! S[t] = onset[t] + max_τ ( S[t − τ] − tightness · ln(τ / period)² )
//! ```
//!
//! The last beat is the frame with the highest cumulative score and the
//! sequence is recovered by following backpointers.
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

/// Parameters of the cumulative-score recursion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpParams {
    /// Beat period in frames (fractional)
    pub period: f64,
    /// Relative half-width of the predecessor search window
    pub tolerance: f64,
    /// Weight of the log-ratio interval penalty
    pub tightness: f64,
    /// Smallest allowed inter-beat interval in frames
    pub min_interval: usize,
}

impl DpParams {
    /// Inclusive range of predecessor offsets searched for every frame
    pub fn search_window(&self) -> (usize, usize) {
        let lo = (self.period * (1.0 - self.tolerance)).round().max(0.0) as usize;
        let hi = (self.period * (1.0 + self.tolerance)).round().max(0.0) as usize;
        (lo.max(self.min_interval), hi.max(self.min_interval))
    }
}

/// Beat frames for `onset`, in increasing order
///
/// Returns an empty vector for an empty envelope or a non-positive period.
pub fn track_beat_frames(onset: &[f32], params: &DpParams) -> Vec<usize> {
    let n = onset.len();
    if n == 0 || !(params.period > 0.0) {
        return Vec::new();
    }

    let (tau_lo, tau_hi) = params.search_window();
    let penalties: Vec<f64> = (tau_lo..=tau_hi)
        .map(|tau| {
            let r = (tau as f64 / params.period).ln();
            params.tightness * r * r
        })
        .collect();

    let mut score = vec![0.0f64; n];
    let mut backlink: Vec<Option<usize>> = vec![None; n];

    for t in 0..n {
        let mut best: Option<(usize, f64)> = None;
        for (tau, penalty) in (tau_lo..=tau_hi).zip(penalties.iter()) {
            if tau > t {
                break;
            }
            let prev = t - tau;
            let candidate = score[prev] - penalty;
            if best.map_or(true, |(_, s)| candidate > s) {
                best = Some((prev, candidate));
            }
        }

        score[t] = onset[t] as f64 + best.map_or(0.0, |(_, s)| s);
        backlink[t] = best.map(|(prev, _)| prev);
    }

    let mut last = 0usize;
    for (t, &s) in score.iter().enumerate() {
        if s > score[last] {
            last = t;
        }
    }

    let mut beats = vec![last];
    let mut cursor = last;
    while let Some(prev) = backlink[cursor] {
        beats.push(prev);
        cursor = prev;
    }
    beats.reverse();

    log::debug!(
        "DP beat tracker: {} beats, window [{}, {}] frames, final score {:.3}",
        beats.len(),
        tau_lo,
        tau_hi,
        score[last]
    );

    beats
}

/// Drop weak beats at both ends of the sequence
///
/// The threshold is half the RMS of the onset strength at the beat frames.
/// Leading and trailing beats at or below it are removed; interior beats are
/// kept. If every beat is at or below the threshold the result is empty.
pub fn trim_weak_beats(onset: &[f32], beats: &[usize]) -> Vec<usize> {
    if beats.is_empty() {
        return Vec::new();
    }

    let strengths: Vec<f64> = beats
        .iter()
        .map(|&b| onset.get(b).copied().unwrap_or(0.0) as f64)
        .collect();
    let rms = (strengths.iter().map(|s| s * s).sum::<f64>() / strengths.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let first = strengths.iter().position(|&s| s > threshold);
    let last = strengths.iter().rposition(|&s| s > threshold);

    match (first, last) {
        (Some(first), Some(last)) => beats[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(period: f64) -> DpParams {
        DpParams {
            period,
            tolerance: 0.3,
            tightness: 100.0,
            min_interval: 17,
        }
    }

    fn pulses(len: usize, period: usize, offset: usize) -> Vec<f32> {
        let mut onset = vec![0.0f32; len];
        let mut i = offset;
        while i < len {
            onset[i] = 1.0;
            i += period;
        }
        onset
    }

    #[test]
    fn test_search_window() {
        assert_eq!(params(43.0).search_window(), (30, 56));
        // The lower bound never drops below the minimum interval.
        assert_eq!(params(20.0).search_window(), (17, 26));
    }

    #[test]
    fn test_tracks_regular_pulses() {
        let onset = pulses(500, 43, 10);
        let beats = track_beat_frames(&onset, &params(43.0));
        let on_pulse: Vec<usize> = beats
            .iter()
            .copied()
            .filter(|&b| onset[b] > 0.0)
            .collect();
        assert!(on_pulse.len() >= 10, "beats: {:?}", beats);
        for pair in beats.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] - pair[0] >= 17);
        }
        for pair in on_pulse.windows(2) {
            assert_eq!((pair[1] - pair[0]) % 43, 0);
        }
    }

    #[test]
    fn test_flat_envelope_follows_period() {
        let onset = vec![0.0f32; 200];
        let beats = track_beat_frames(&onset, &params(40.0));
        // Zero onset everywhere: the first frame wins and has no predecessor.
        assert_eq!(beats, vec![0]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(track_beat_frames(&[], &params(43.0)).is_empty());
        assert!(track_beat_frames(&[1.0, 0.0], &params(0.0)).is_empty());
    }

    #[test]
    fn test_trim_removes_weak_edges() {
        let mut onset = vec![0.0f32; 300];
        for &b in &[40, 80, 120, 160] {
            onset[b] = 1.0;
        }
        onset[200] = 0.05;
        let beats = vec![0, 40, 80, 120, 160, 200];
        assert_eq!(trim_weak_beats(&onset, &beats), vec![40, 80, 120, 160]);
    }

    #[test]
    fn test_trim_keeps_interior_weak_beats() {
        let mut onset = vec![0.0f32; 200];
        onset[10] = 1.0;
        onset[50] = 0.01;
        onset[90] = 1.0;
        assert_eq!(trim_weak_beats(&onset, &[10, 50, 90]), vec![10, 50, 90]);
    }

    #[test]
    fn test_trim_all_silent() {
        let onset = vec![0.0f32; 100];
        assert!(trim_weak_beats(&onset, &[0, 40, 80]).is_empty());
    }
}
