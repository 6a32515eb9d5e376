// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Exact discretized score distributions.
//!
//! A window score is a sum of per-position contributions, one drawn
//! uniformly per position. Discretizing the contributions to integer bins
//! makes the exact distribution of the sum computable by dynamic
//! programming: convolve the positions left to right in log2 space, then
//! accumulate the PDF from the top into a survival function. Both the FIMO
//! score-to-p-value lookup and the rigorous TOMTOM null use this engine;
//! for FIMO the per-position choices are the four symbols of a log-PWM
//! column, each with background probability 1/4.

use crate::errors::{Error, Result};
use crate::motifs::LogPwm;
use crate::stats::log2probs::log2_add_exp;

/// The distribution of discretized window scores, stored as a log2
/// survival function over all attainable score bins.
///
/// Bin `k` covers the score `(k + smallest) * bin_size`; `log_sf[k]` is
/// `log2 Pr(S >= (k + smallest) * bin_size)`. The survival values are
/// non-increasing, start at zero (the whole mass sits above the minimum)
/// and the buffer carries `w` spare bins of headroom at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreDist {
    smallest: i64,
    log_sf: Vec<f64>,
    bin_size: f64,
    // highest bin any word actually reaches; lookups clamp here so that
    // rounding drift between a real-valued score and the discretized
    // columns cannot fall off into the empty headroom
    top: usize,
}

impl ScoreDist {
    /// Distribution of window scores of a log-PWM under the uniform
    /// background, with contributions discretized to `bin_size`.
    ///
    /// ```
    /// use memelite::motifs::Pwm;
    /// use memelite::stats::ScoreDist;
    /// use ndarray::array;
    ///
    /// let pwm = Pwm::new(array![
    ///     [0.97, 0.01],
    ///     [0.01, 0.97],
    ///     [0.01, 0.01],
    ///     [0.01, 0.01],
    /// ])
    /// .unwrap();
    /// let dist = ScoreDist::from_log_pwm(&pwm.log_pwm(1e-4), 0.1).unwrap();
    /// // the survival function never increases with the score
    /// assert!(dist.log_sf().windows(2).all(|pair| pair[0] >= pair[1]));
    /// ```
    pub fn from_log_pwm(log_pwm: &LogPwm, bin_size: f64) -> Result<ScoreDist> {
        let scores = log_pwm.scores();
        let columns: Vec<Vec<i64>> = (0..log_pwm.width())
            .map(|j| {
                (0..scores.nrows())
                    .map(|a| round_to_bin(scores[[a, j]], bin_size))
                    .collect()
            })
            .collect();
        ScoreDist::from_int_columns(&columns, bin_size)
    }

    /// Distribution of the sum of one uniformly drawn value per column.
    /// Column values are already discretized to integer multiples of
    /// `bin_size`.
    pub fn from_int_columns(columns: &[Vec<i64>], bin_size: f64) -> Result<ScoreDist> {
        if !(bin_size > 0.0) {
            return Err(Error::InvalidBinSize(bin_size));
        }
        if columns.is_empty() || columns.iter().any(|col| col.is_empty()) {
            return Err(Error::EmptyMotif);
        }
        let w = columns.len();

        // range bounds from the prefix sums of per-column extrema, with
        // w bins of slack above
        let mut min_csum = 0i64;
        let mut max_csum = 0i64;
        let mut smallest = i64::MAX;
        let mut largest = i64::MIN;
        for col in columns {
            min_csum += col.iter().min().copied().unwrap_or(0);
            max_csum += col.iter().max().copied().unwrap_or(0);
            smallest = smallest.min(min_csum);
            largest = largest.max(max_csum);
        }
        let largest = largest + w as i64;
        let size = (largest - smallest + 1) as usize;

        // forward convolution over two buffers
        let mut old = vec![f64::NEG_INFINITY; size];
        let mut new = vec![f64::NEG_INFINITY; size];
        let log_choice = -(columns[0].len() as f64).log2();
        for &v in &columns[0] {
            let idx = (v - smallest) as usize;
            old[idx] = log2_add_exp(old[idx], log_choice);
        }
        for col in &columns[1..] {
            for cell in new.iter_mut() {
                *cell = f64::NEG_INFINITY;
            }
            let log_choice = -(col.len() as f64).log2();
            for k in 0..size {
                if old[k] == f64::NEG_INFINITY {
                    continue;
                }
                for &v in col {
                    let idx = (k as i64 + v) as usize;
                    new[idx] = log2_add_exp(new[idx], log_choice + old[k]);
                }
            }
            std::mem::swap(&mut old, &mut new);
        }

        let top = old
            .iter()
            .rposition(|&x| x != f64::NEG_INFINITY)
            .unwrap_or(0);

        // in-place accumulation of the PDF into a survival function
        for i in (0..size - 1).rev() {
            old[i] = log2_add_exp(old[i], old[i + 1]);
        }

        Ok(ScoreDist {
            smallest,
            log_sf: old,
            bin_size,
            top,
        })
    }

    /// Index of the lowest score bin.
    pub fn smallest(&self) -> i64 {
        self.smallest
    }

    /// Width of one score bin.
    pub fn bin_size(&self) -> f64 {
        self.bin_size
    }

    /// The log2 survival values, lowest score bin first.
    pub fn log_sf(&self) -> &[f64] {
        &self.log_sf
    }

    pub fn len(&self) -> usize {
        self.log_sf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_sf.is_empty()
    }

    fn bin_index(&self, score: f64) -> usize {
        let k = (score / self.bin_size).floor() as i64 - self.smallest;
        k.max(0).min(self.top as i64) as usize
    }

    /// `log2 Pr(S >= score)`, looked up in the bin containing `score`.
    /// Scores outside the attainable range clamp to the closest attained
    /// bin, so the result is never a false zero.
    pub fn log_pvalue(&self, score: f64) -> f64 {
        self.log_sf[self.bin_index(score)]
    }

    /// `Pr(S >= score)`.
    pub fn pvalue(&self, score: f64) -> f64 {
        self.log_pvalue(score).exp2()
    }

    /// The smallest score whose bin already has a survival probability
    /// below `max_pvalue`. Window scores strictly above the returned
    /// threshold have p-values of at most `max_pvalue`, up to one bin of
    /// discretization slack.
    ///
    /// Returns `+inf` when no bin qualifies and `-inf` for `max_pvalue >=
    /// 1`, where every score qualifies.
    pub fn score_threshold(&self, max_pvalue: f64) -> f64 {
        if max_pvalue >= 1.0 {
            return f64::NEG_INFINITY;
        }
        let log_threshold = max_pvalue.log2();
        for (k, &lp) in self.log_sf.iter().enumerate() {
            if lp < log_threshold {
                return (k as i64 + self.smallest) as f64 * self.bin_size;
            }
        }
        f64::INFINITY
    }
}

fn round_to_bin(score: f64, bin_size: f64) -> i64 {
    (score / bin_size).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motifs::Pwm;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_survival_starts_at_zero_and_is_non_increasing() {
        let pwm = Pwm::new(array![
            [0.8, 0.1, 0.1],
            [0.1, 0.7, 0.2],
            [0.05, 0.1, 0.6],
            [0.05, 0.1, 0.1],
        ])
        .unwrap();
        let dist = ScoreDist::from_log_pwm(&pwm.log_pwm(1e-4), 0.1).unwrap();
        let sf = dist.log_sf();
        assert!(sf[0].abs() < 1e-9);
        for pair in sf.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_constant_columns_collapse() {
        // all-equal symbols make every word score the same
        let log_pwm = Pwm::uniform(3).unwrap().log_pwm(0.0);
        let dist = ScoreDist::from_log_pwm(&log_pwm, 0.1).unwrap();
        assert_eq!(dist.smallest(), 0);
        assert_eq!(dist.len(), 4);
        assert!(dist.log_sf()[0].abs() < 1e-9);
        // the whole mass sits in the lowest bin
        assert_relative_eq!(dist.pvalue(0.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_one_hot_motif_max_word_probability() {
        // a (near) one-hot motif has a unique best word with mass 4^-w
        let w = 3;
        let mut probs = Array2::from_elem((4, w), 1e-9);
        for j in 0..w {
            probs[[0, j]] = 1.0 - 3e-9;
        }
        let pwm = Pwm::new(probs).unwrap();
        let dist = ScoreDist::from_log_pwm(&pwm.log_pwm(1e-4), 0.1).unwrap();
        let max_score: f64 = (0..w).map(|j| pwm.log_pwm(1e-4).scores()[[0, j]]).sum();
        assert_relative_eq!(dist.pvalue(max_score), 0.25f64.powi(w as i32), epsilon = 1e-12);
    }

    #[test]
    fn test_max_word_pvalue_lower_bound() {
        let pwm = Pwm::new(array![
            [0.9, 0.2],
            [0.04, 0.5],
            [0.03, 0.2],
            [0.03, 0.1],
        ])
        .unwrap();
        let log_pwm = pwm.log_pwm(1e-4);
        let dist = ScoreDist::from_log_pwm(&log_pwm, 0.1).unwrap();
        let max_score: f64 = (0..2)
            .map(|j| {
                (0..4)
                    .map(|a| log_pwm.scores()[[a, j]])
                    .fold(f64::NEG_INFINITY, f64::max)
            })
            .sum();
        assert!(dist.pvalue(max_score) >= 0.25f64.powi(2));
    }

    #[test]
    fn test_score_threshold_walk() {
        let pwm = Pwm::new(array![
            [0.85, 0.05],
            [0.05, 0.85],
            [0.05, 0.05],
            [0.05, 0.05],
        ])
        .unwrap();
        let dist = ScoreDist::from_log_pwm(&pwm.log_pwm(1e-4), 0.1).unwrap();
        let threshold = dist.score_threshold(1e-1);
        assert!(threshold.is_finite());
        // scores above the threshold do have small p-values
        assert!(dist.pvalue(threshold + dist.bin_size()) <= 1e-1 * 2.0);
        // p >= 1 admits everything
        assert_eq!(dist.score_threshold(1.0), f64::NEG_INFINITY);
        // p = 0 admits nothing
        assert_eq!(dist.score_threshold(0.0), f64::INFINITY);
    }

    #[test]
    fn test_invalid_bin_size() {
        let pwm = Pwm::uniform(2).unwrap();
        assert_eq!(
            ScoreDist::from_log_pwm(&pwm.log_pwm(1e-4), 0.0),
            Err(Error::InvalidBinSize(0.0))
        );
        assert_eq!(
            ScoreDist::from_log_pwm(&pwm.log_pwm(1e-4), -0.5),
            Err(Error::InvalidBinSize(-0.5))
        );
    }

    #[test]
    fn test_int_columns_two_coins() {
        // two positions, each uniformly -1 or +1
        let columns = vec![vec![-1, 1], vec![-1, 1]];
        let dist = ScoreDist::from_int_columns(&columns, 1.0).unwrap();
        assert_eq!(dist.smallest(), -2);
        // Pr(S >= -2) = 1, Pr(S >= 0) = 3/4, Pr(S >= 2) = 1/4
        assert_relative_eq!(dist.pvalue(-2.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dist.pvalue(0.0), 0.75, epsilon = 1e-12);
        assert_relative_eq!(dist.pvalue(2.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_lookup_clamps_to_attained_range() {
        let columns = vec![vec![-1, 1], vec![-1, 1]];
        let dist = ScoreDist::from_int_columns(&columns, 1.0).unwrap();
        // far below: the whole mass; far above: the top bin, never zero
        assert_relative_eq!(dist.pvalue(-100.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(dist.pvalue(100.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_columns_rejected() {
        assert_eq!(
            ScoreDist::from_int_columns(&[], 1.0),
            Err(Error::EmptyMotif)
        );
        assert_eq!(
            ScoreDist::from_int_columns(&[vec![1], vec![]], 1.0),
            Err(Error::EmptyMotif)
        );
    }
}
