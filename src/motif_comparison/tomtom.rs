// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! TOMTOM: motif-to-motif similarity.
//!
//! Each query column is compared to every target column with a negated
//! Euclidean distance. Per query column the background level of those
//! similarities is removed by subtracting its approximate median, so that
//! a column only contributes positively where it resembles the target
//! better than a typical target column. All ungapped offsets of the query
//! against the target (and, by default, against its reverse complement)
//! are then scored, and the best alignment is reported with a p-value.
//!
//! # Example
//!
//! ```
//! use memelite::motifs::{Motif, Pwm};
//! use memelite::motif_comparison::tomtom::{tomtom, TomtomOptions};
//! use ndarray::array;
//!
//! let pwm = Pwm::new(array![
//!     [0.9, 0.1, 0.1],
//!     [0.05, 0.7, 0.1],
//!     [0.03, 0.1, 0.7],
//!     [0.02, 0.1, 0.1],
//! ])
//! .unwrap();
//! let motifs = vec![Motif::new("m", pwm)];
//! let results = tomtom(&motifs, &motifs, TomtomOptions::default()).unwrap();
//! assert_eq!(results.offsets[[0, 0]], 0);
//! assert_eq!(results.overlaps[[0, 0]], 3);
//! assert_eq!(results.strands[[0, 0]], 0);
//! ```

use ndarray::Array2;
use ordered_float::OrderedFloat;

use crate::errors::Result;
use crate::motifs::{Motif, Pwm};
use crate::stats::{binned_median, ScoreDist};

/// How alignment scores are converted into p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PValueMode {
    /// The legacy placeholder `max(1e-15, exp(-|score| / 100))`. Fast and
    /// deterministic, but carries no probabilistic meaning.
    Heuristic,
    /// Survival probability of the observed score under a null where each
    /// overlap column's similarity is drawn uniformly from the similarities
    /// against the target's own columns, computed by exact convolution over
    /// `n_score_bins` discretized bins.
    ExactTargetColumns,
}

/// Comparison parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TomtomOptions {
    /// Bins for the discretized null distribution of alignment scores.
    pub n_score_bins: usize,
    /// Bins for the per-column background median estimate.
    pub n_median_bins: usize,
    /// Also align against the reverse complement of each target.
    pub reverse_complement: bool,
    pub p_value_mode: PValueMode,
}

impl Default for TomtomOptions {
    fn default() -> Self {
        TomtomOptions {
            n_score_bins: 100,
            n_median_bins: 1000,
            reverse_complement: true,
            p_value_mode: PValueMode::Heuristic,
        }
    }
}

/// Query × target result matrices. `strands` holds 1 where the reverse
/// complement of the target aligned strictly better than the target
/// itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TomtomResults {
    pub p_values: Array2<f64>,
    pub scores: Array2<f64>,
    pub offsets: Array2<isize>,
    pub overlaps: Array2<usize>,
    pub strands: Array2<u8>,
}

// The best ungapped alignment of a query against one target orientation.
#[derive(Debug, Clone, Copy)]
struct Alignment {
    offset: isize,
    overlap: usize,
    score: f64,
}

/// A comparison engine holding both orientations of every target.
pub struct TomtomAligner {
    opts: TomtomOptions,
    targets: Vec<(Pwm, Pwm)>,
}

impl TomtomAligner {
    pub fn new(targets: &[Motif], opts: TomtomOptions) -> TomtomAligner {
        assert!(opts.n_score_bins > 0, "need at least one score bin");
        assert!(opts.n_median_bins > 0, "need at least one median bin");
        let targets = targets
            .iter()
            .map(|t| (t.pwm.clone(), t.pwm.rev_comp()))
            .collect();
        TomtomAligner { opts, targets }
    }

    /// Compare every query against every target.
    ///
    /// The per-pair loop is embarrassingly parallel; results land in
    /// query-major matrices regardless of evaluation order.
    pub fn compare(&self, queries: &[Motif]) -> Result<TomtomResults> {
        let shape = (queries.len(), self.targets.len());
        let mut results = TomtomResults {
            p_values: Array2::from_elem(shape, 1.0),
            scores: Array2::zeros(shape),
            offsets: Array2::zeros(shape),
            overlaps: Array2::zeros(shape),
            strands: Array2::zeros(shape),
        };

        for (qi, query) in queries.iter().enumerate() {
            for (ti, (fwd, rc)) in self.targets.iter().enumerate() {
                let centered_fwd = centered_distances(&query.pwm, fwd, self.opts.n_median_bins);
                let best_fwd = best_alignment(&centered_fwd);

                let (best, centered, strand) = if self.opts.reverse_complement {
                    let centered_rc = centered_distances(&query.pwm, rc, self.opts.n_median_bins);
                    let best_rc = best_alignment(&centered_rc);
                    if best_rc.score > best_fwd.score {
                        (best_rc, centered_rc, 1)
                    } else {
                        (best_fwd, centered_fwd, 0)
                    }
                } else {
                    (best_fwd, centered_fwd, 0)
                };

                results.p_values[[qi, ti]] = match self.opts.p_value_mode {
                    PValueMode::Heuristic => (-best.score.abs() / 100.0).exp().max(1e-15),
                    PValueMode::ExactTargetColumns => {
                        exact_pvalue(&centered, &best, self.opts.n_score_bins)?
                    }
                };
                results.scores[[qi, ti]] = best.score;
                results.offsets[[qi, ti]] = best.offset;
                results.overlaps[[qi, ti]] = best.overlap;
                results.strands[[qi, ti]] = strand;
            }
        }
        Ok(results)
    }
}

// Column similarities of query vs target, background-centered: entry
// [tp, qp] is the negated Euclidean distance between target column tp and
// query column qp, minus the approximate median of query column qp's
// similarities against all target columns.
fn centered_distances(query: &Pwm, target: &Pwm, n_median_bins: usize) -> Array2<f64> {
    let (wq, wt) = (query.width(), target.width());
    let q = query.probs();
    let t = target.probs();

    let mut dist = Array2::zeros((wt, wq));
    for tp in 0..wt {
        for qp in 0..wq {
            let sq: f64 = (0..q.nrows())
                .map(|a| {
                    let d = q[[a, qp]] - t[[a, tp]];
                    d * d
                })
                .sum();
            dist[[tp, qp]] = -sq.sqrt();
        }
    }

    let counts = vec![1.0; wt];
    for qp in 0..wq {
        let column: Vec<f64> = (0..wt).map(|tp| dist[[tp, qp]]).collect();
        let vmin = column.iter().cloned().fold(f64::INFINITY, f64::min);
        let vmax = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let median = binned_median(&column, &counts, vmin, vmax, n_median_bins);
        for tp in 0..wt {
            dist[[tp, qp]] -= median;
        }
    }
    dist
}

// Score every ungapped offset of the query against the target and keep
// the best; ties go to the smallest offset.
fn best_alignment(centered: &Array2<f64>) -> Alignment {
    let (wt, wq) = centered.dim();
    let mut best = Alignment {
        offset: -(wq as isize - 1),
        overlap: 0,
        score: f64::NEG_INFINITY,
    };
    for offset in -(wq as isize - 1)..=(wt as isize - 1) {
        let mut score = 0.0;
        let mut overlap = 0;
        for qp in 0..wq {
            let tp = qp as isize + offset;
            if tp >= 0 && (tp as usize) < wt {
                score += centered[[tp as usize, qp]];
                overlap += 1;
            }
        }
        if OrderedFloat(score) > OrderedFloat(best.score) {
            best = Alignment {
                offset,
                overlap,
                score,
            };
        }
    }
    best
}

// Survival probability of the observed alignment score, with each overlap
// column drawn uniformly from the similarities against the target's own
// columns.
fn exact_pvalue(centered: &Array2<f64>, best: &Alignment, n_score_bins: usize) -> Result<f64> {
    let (wt, wq) = centered.dim();
    let overlap_columns: Vec<usize> = (0..wq)
        .filter(|&qp| {
            let tp = qp as isize + best.offset;
            tp >= 0 && (tp as usize) < wt
        })
        .collect();

    let mut vmin = f64::INFINITY;
    let mut vmax = f64::NEG_INFINITY;
    for &qp in &overlap_columns {
        for tp in 0..wt {
            vmin = vmin.min(centered[[tp, qp]]);
            vmax = vmax.max(centered[[tp, qp]]);
        }
    }
    if vmax == vmin {
        // all candidate scores coincide; the observed one is no exception
        return Ok(1.0);
    }

    let bin_size = (vmax - vmin) / n_score_bins as f64;
    let columns: Vec<Vec<i64>> = overlap_columns
        .iter()
        .map(|&qp| {
            (0..wt)
                .map(|tp| (centered[[tp, qp]] / bin_size).round() as i64)
                .collect()
        })
        .collect();
    let dist = ScoreDist::from_int_columns(&columns, bin_size)?;
    Ok(dist.pvalue(best.score))
}

/// Compare motif lists: query × target matrices of best alignments and
/// p-values. See [`TomtomAligner::compare`].
pub fn tomtom(queries: &[Motif], targets: &[Motif], opts: TomtomOptions) -> Result<TomtomResults> {
    TomtomAligner::new(targets, opts).compare(queries)
}
