// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! FIMO: scanning sequences for motif instances.
//!
//! Every window of a sequence is scored against a motif's log-PWM; windows
//! whose score clears a threshold derived from the motif's exact score
//! distribution are reported as hits with their p-values. Scanning covers
//! the forward strand and, by default, the reverse complement.
//!
//! # Example
//!
//! ```
//! use memelite::motifs::{Motif, Pwm};
//! use memelite::pattern_matching::fimo::{fimo, FimoOptions};
//! use ndarray::array;
//!
//! let pwm = Pwm::new(array![
//!     [0.8, 0.1],
//!     [0.1, 0.8],
//!     [0.05, 0.05],
//!     [0.05, 0.05],
//! ])
//! .unwrap();
//! let motifs = vec![Motif::new("simple", pwm)];
//! let opts = FimoOptions {
//!     threshold: 0.5,
//!     ..FimoOptions::default()
//! };
//! let results = fimo(&motifs, &[b"ACGTACGT"], opts).unwrap();
//! assert_eq!(results[0].motif_name, "simple");
//! assert!(results[0].hits.iter().any(|h| h.start == 0));
//! ```

use serde::{Deserialize, Serialize};

use crate::alphabets::dna::IGNORED;
use crate::errors::Result;
use crate::motifs::{LogPwm, Motif, OneHot, Strand, DEFAULT_EPS};
use crate::stats::ScoreDist;

/// Scanning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FimoOptions {
    /// Maximum allowed hit p-value.
    pub threshold: f64,
    /// Bin width for the discretized score distribution.
    pub bin_size: f64,
    /// Pseudocount applied to motif probabilities.
    pub eps: f64,
    /// Also scan the reverse complement strand.
    pub reverse_complement: bool,
}

impl Default for FimoOptions {
    fn default() -> Self {
        FimoOptions {
            threshold: 1e-4,
            bin_size: 0.1,
            eps: DEFAULT_EPS,
            reverse_complement: true,
        }
    }
}

/// A single motif occurrence.
///
/// Positions are 0-based and `end` is exclusive. For reverse strand hits,
/// `start` and `end` index into the reverse complement of the scanned
/// sequence (0-based from its 5' end); they are intentionally not
/// translated back to the forward frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub sequence_idx: usize,
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
    pub score: f64,
    pub p_value: f64,
}

/// All hits of one motif across the scanned sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotifResult {
    pub motif_name: String,
    pub hits: Vec<Hit>,
}

// Per-motif state derived once and reused across sequences.
struct PreparedMotif {
    name: String,
    log_pwm: LogPwm,
    dist: ScoreDist,
    score_threshold: f64,
}

/// A scanner holding per-motif derived state (log-PWMs, score
/// distributions and score thresholds), reusable across sequence sets.
pub struct FimoScanner {
    opts: FimoOptions,
    motifs: Vec<PreparedMotif>,
}

impl FimoScanner {
    pub fn new(motifs: &[Motif], opts: FimoOptions) -> Result<FimoScanner> {
        let motifs = motifs
            .iter()
            .map(|motif| {
                let log_pwm = motif.pwm.log_pwm(opts.eps);
                let dist = ScoreDist::from_log_pwm(&log_pwm, opts.bin_size)?;
                let score_threshold = dist.score_threshold(opts.threshold);
                Ok(PreparedMotif {
                    name: motif.name.clone(),
                    log_pwm,
                    dist,
                    score_threshold,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FimoScanner { opts, motifs })
    }

    /// Scan sequences against every prepared motif.
    ///
    /// Hits are grouped per motif and emitted in deterministic order:
    /// sequences in input order, forward strand before reverse, ascending
    /// start within a strand. Sequences shorter than a motif simply yield
    /// no hits for it. The per-motif outer loop is embarrassingly parallel
    /// if a caller wants to split it.
    pub fn scan<S: AsRef<[u8]>>(&self, sequences: &[S]) -> Result<Vec<MotifResult>> {
        if sequences.is_empty() {
            return Ok(Vec::new());
        }
        let encoded = sequences
            .iter()
            .map(|s| OneHot::encode(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let rc: Vec<OneHot> = if self.opts.reverse_complement {
            encoded.iter().map(OneHot::rev_comp).collect()
        } else {
            Vec::new()
        };

        Ok(self
            .motifs
            .iter()
            .map(|motif| {
                let mut hits = Vec::new();
                for (sequence_idx, onehot) in encoded.iter().enumerate() {
                    scan_strand(motif, sequence_idx, onehot, Strand::Forward, &mut hits);
                    if self.opts.reverse_complement {
                        scan_strand(motif, sequence_idx, &rc[sequence_idx], Strand::Reverse, &mut hits);
                    }
                }
                MotifResult {
                    motif_name: motif.name.clone(),
                    hits,
                }
            })
            .collect())
    }
}

fn scan_strand(
    motif: &PreparedMotif,
    sequence_idx: usize,
    onehot: &OneHot,
    strand: Strand,
    hits: &mut Vec<Hit>,
) {
    let w = motif.log_pwm.width();
    let ranks = onehot.ranks();
    if ranks.len() < w {
        return;
    }
    let scores = motif.log_pwm.scores();
    for start in 0..=ranks.len() - w {
        // ignored bases contribute nothing to the window score
        let mut score = 0.0;
        for (j, &r) in ranks[start..start + w].iter().enumerate() {
            if r != IGNORED {
                score += scores[[r as usize, j]];
            }
        }
        if score > motif.score_threshold {
            hits.push(Hit {
                sequence_idx,
                start,
                end: start + w,
                strand,
                score,
                p_value: motif.dist.pvalue(score),
            });
        }
    }
}

/// Scan `sequences` for instances of `motifs`: one [`MotifResult`] per
/// motif, in motif order. See [`FimoScanner::scan`] for hit ordering and
/// [`Hit`] for the reverse strand coordinate convention.
pub fn fimo<S: AsRef<[u8]>>(
    motifs: &[Motif],
    sequences: &[S],
    opts: FimoOptions,
) -> Result<Vec<MotifResult>> {
    if motifs.is_empty() {
        return Ok(Vec::new());
    }
    FimoScanner::new(motifs, opts)?.scan(sequences)
}
