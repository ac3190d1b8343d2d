//! Peak detection on periodicity curves
//!
//! Local-maximum search restricted to a lag range, plus parabolic refinement
//! of a peak to sub-frame precision.

const EPSILON: f32 = 1e-10;

/// Find local maxima of `signal` with index in `[lo, hi]`
///
/// A point is a peak when it is strictly above its left neighbour and not below
/// its right neighbour (so a plateau reports its first point). Neighbours
/// outside the signal count as `-inf`, which lets range endpoints qualify.
///
/// # Returns
///
/// `(index, value)` pairs in index order; values below `EPSILON` are ignored.
///
/// # Example
///
/// ```
/// use cadence_dsp::features::period::peak_picking::find_peaks_in_range;
///
/// let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
/// let peaks = find_peaks_in_range(&signal, 1, 5);
/// assert_eq!(peaks, vec![(2, 1.0), (5, 0.9)]);
/// ```
pub fn find_peaks_in_range(signal: &[f32], lo: usize, hi: usize) -> Vec<(usize, f32)> {
    if signal.is_empty() || lo > hi || lo >= signal.len() {
        return vec![];
    }

    let hi = hi.min(signal.len() - 1);
    let mut peaks = Vec::new();

    for i in lo..=hi {
        let value = signal[i];
        if value < EPSILON {
            continue;
        }

        let left = if i > 0 { signal[i - 1] } else { f32::NEG_INFINITY };
        let right = signal.get(i + 1).copied().unwrap_or(f32::NEG_INFINITY);

        if value > left && value >= right {
            peaks.push((i, value));
        }
    }

    peaks
}

/// Refine a peak position by fitting a parabola through it and its neighbours
///
/// Returns the fractional index; the offset is clamped to ±0.5 and falls back
/// to the integer index at the signal edges or on a flat top.
pub fn refine_peak(signal: &[f32], index: usize) -> f32 {
    if index == 0 || index + 1 >= signal.len() {
        return index as f32;
    }

    let y0 = signal[index - 1];
    let y1 = signal[index];
    let y2 = signal[index + 1];
    let denom = y0 - 2.0 * y1 + y2;

    if denom.abs() < EPSILON {
        return index as f32;
    }

    let delta = (0.5 * (y0 - y2) / denom).clamp(-0.5, 0.5);
    index as f32 + delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks_in_range_limits() {
        let signal = vec![0.0, 0.5, 1.0, 0.7, 0.3, 0.9, 0.2];
        assert_eq!(find_peaks_in_range(&signal, 3, 6), vec![(5, 0.9)]);
        assert!(find_peaks_in_range(&signal, 7, 9).is_empty());
        assert!(find_peaks_in_range(&[], 0, 3).is_empty());
    }

    #[test]
    fn test_find_peaks_plateau_reports_first() {
        let signal = vec![0.0, 1.0, 1.0, 0.0];
        assert_eq!(find_peaks_in_range(&signal, 0, 3), vec![(1, 1.0)]);
    }

    #[test]
    fn test_find_peaks_ignores_zero_curve() {
        assert!(find_peaks_in_range(&[0.0; 10], 0, 9).is_empty());
    }

    #[test]
    fn test_refine_symmetric_peak() {
        let signal = vec![0.0, 0.5, 1.0, 0.5, 0.0];
        assert!((refine_peak(&signal, 2) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_refine_skewed_peak() {
        let signal = vec![0.0, 0.8, 1.0, 0.2, 0.0];
        let refined = refine_peak(&signal, 2);
        assert!(refined < 2.0 && refined > 1.5, "refined={}", refined);
        assert_eq!(refine_peak(&signal, 0), 0.0);
    }
}
