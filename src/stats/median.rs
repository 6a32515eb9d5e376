// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Approximate weighted median over a bounded range.
//!
//! The sample is binned into a fixed number of equal-width buckets and the
//! median is reported as the mean of the bucket containing the halfway
//! weight. This runs in O(N) time with constant memory, which matters for
//! callers that take medians many times over small samples (the motif
//! comparison engine takes one per query column per motif pair).

use itertools::izip;

/// Weighted median of `values` (with multiplicities `counts`) over the
/// closed range `[vmin, vmax]`, approximated with `n_bins` buckets.
///
/// The result is exact up to one bucket width. Degenerate inputs collapse:
/// an empty range returns `vmin`.
///
/// ```
/// use memelite::stats::binned_median;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let counts = [1.0; 5];
/// let m = binned_median(&values, &counts, 1.0, 5.0, 1000);
/// assert!((m - 3.0).abs() < 0.01);
/// ```
pub fn binned_median(
    values: &[f64],
    counts: &[f64],
    vmin: f64,
    vmax: f64,
    n_bins: usize,
) -> f64 {
    assert_eq!(values.len(), counts.len(), "values and counts must zip");
    assert!(n_bins > 0, "need at least one bin");

    if vmax == vmin {
        return vmin;
    }

    let scale = (n_bins - 1) as f64 / (vmax - vmin);
    let mut bin_counts = vec![0.0; n_bins];
    let mut bin_sums = vec![0.0; n_bins];
    for (&v, &c) in izip!(values, counts) {
        let idx = (((v - vmin) * scale).floor().max(0.0) as usize).min(n_bins - 1);
        bin_counts[idx] += c;
        bin_sums[idx] += v * c;
    }

    let half = bin_counts.iter().sum::<f64>() / 2.0;
    let mut cumulative = 0.0;
    for (&count, &sum) in izip!(&bin_counts, &bin_sums) {
        cumulative += count;
        if cumulative >= half {
            return if count > 0.0 { sum / count } else { vmin };
        }
    }
    vmax
}
