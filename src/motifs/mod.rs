// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Value types for sequence motifs: probability matrices, their log-space
//! transforms and one-hot encoded sequences.
//!
//! A [`Pwm`] stores one column of symbol probabilities per motif position
//! (rows ordered A, C, G, T). Scoring happens in log-likelihood-ratio space
//! over a uniform background, via [`LogPwm`]. Sequences enter the scanners as
//! [`OneHot`] matrices; bases outside the alphabet that are listed in an
//! ignore set (by default `N`) become all-zero columns.
//!
//! # Example
//!
//! ```
//! use memelite::motifs::{characters, OneHot};
//!
//! let onehot = OneHot::encode(b"ACGT").unwrap();
//! assert_eq!(onehot.decode(), "ACGT");
//! assert_eq!(characters(&onehot.to_freqs(), false).unwrap(), "ACGT");
//! ```

use std::fmt;

use ndarray::{Array2, Axis};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::alphabets::dna::{self, ALPHABET_LEN, IGNORED};
use crate::alphabets::Alphabet;
use crate::errors::{Error, Result};
use crate::utils::TextSlice;

/// Uniform background frequency assumed for every symbol.
pub const UNIFORM_BG: f64 = 0.25;

/// Default additive pseudocount applied before the log transform.
pub const DEFAULT_EPS: f64 = 1e-4;

/// The strand a motif hit was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

/// A position weight matrix: per motif position, the probability of each
/// symbol. Shape is alphabet × width; immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Pwm {
    probs: Array2<f64>,
}

impl Pwm {
    /// Create a PWM from an alphabet × width probability matrix.
    pub fn new(probs: Array2<f64>) -> Result<Self> {
        if probs.nrows() != ALPHABET_LEN {
            return Err(Error::InvalidAlphabetSize {
                expected: ALPHABET_LEN,
                got: probs.nrows(),
            });
        }
        if probs.ncols() == 0 {
            return Err(Error::EmptyMotif);
        }
        Ok(Pwm { probs })
    }

    /// Create a PWM from position-major rows, each holding the four symbol
    /// probabilities of one motif position (the layout of MEME files).
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyMotif);
        }
        let mut probs = Array2::zeros((ALPHABET_LEN, rows.len()));
        for (j, row) in rows.iter().enumerate() {
            if row.len() != ALPHABET_LEN {
                return Err(Error::RowWidthMismatch {
                    expected: ALPHABET_LEN,
                    got: row.len(),
                });
            }
            for (a, &p) in row.iter().enumerate() {
                probs[[a, j]] = p;
            }
        }
        Pwm::new(probs)
    }

    /// The uninformative motif of the given width.
    pub fn uniform(width: usize) -> Result<Self> {
        Pwm::new(Array2::from_elem((ALPHABET_LEN, width), UNIFORM_BG))
    }

    /// Motif width in positions.
    pub fn width(&self) -> usize {
        self.probs.ncols()
    }

    /// The underlying probability matrix.
    pub fn probs(&self) -> &Array2<f64> {
        &self.probs
    }

    /// The reverse complement motif: positions reversed, each symbol row
    /// swapped with its complement.
    pub fn rev_comp(&self) -> Pwm {
        Pwm {
            probs: rev_comp_matrix(&self.probs),
        }
    }

    /// Transform into log-likelihood-ratio space over the uniform
    /// background: `log2((p + eps) / 0.25)` per cell. The pseudocount `eps`
    /// keeps zero probabilities finite.
    pub fn log_pwm(&self, eps: f64) -> LogPwm {
        LogPwm {
            scores: self.probs.mapv(|p| ((p + eps) / UNIFORM_BG).log2()),
        }
    }
}

/// A PWM transformed into log-likelihood-ratio space. Window scores are
/// plain sums over its cells.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPwm {
    scores: Array2<f64>,
}

impl LogPwm {
    /// Motif width in positions.
    pub fn width(&self) -> usize {
        self.scores.ncols()
    }

    /// The underlying score matrix.
    pub fn scores(&self) -> &Array2<f64> {
        &self.scores
    }

    /// The reverse complement of this matrix.
    pub fn rev_comp(&self) -> LogPwm {
        LogPwm {
            scores: rev_comp_matrix(&self.scores),
        }
    }
}

// Shared by Pwm and LogPwm: reverse column order, complement rows.
fn rev_comp_matrix(matrix: &Array2<f64>) -> Array2<f64> {
    let (n, w) = matrix.dim();
    Array2::from_shape_fn((n, w), |(a, j)| matrix[[n - 1 - a, w - 1 - j]])
}

/// A named motif, the unit exchanged with MEME files and the scanning and
/// comparison algorithms.
#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    pub name: String,
    pub pwm: Pwm,
}

impl Motif {
    pub fn new<S: Into<String>>(name: S, pwm: Pwm) -> Self {
        Motif {
            name: name.into(),
            pwm,
        }
    }
}

/// One-hot encoding of a DNA sequence: an alphabet × length 0/1 matrix with
/// at most one set entry per column. A compact rank vector (A=0..T=3,
/// [`IGNORED`] for skipped bases) is kept alongside so scanners can index
/// score matrices directly instead of walking all four rows per position.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHot {
    matrix: Array2<u8>,
    ranks: Vec<u8>,
}

impl OneHot {
    /// Encode a sequence, ignoring `N`/`n`.
    ///
    /// ```
    /// use memelite::motifs::OneHot;
    ///
    /// let onehot = OneHot::encode(b"ACNGT").unwrap();
    /// assert_eq!(onehot.matrix().column(2).sum(), 0);
    /// ```
    pub fn encode(text: TextSlice) -> Result<OneHot> {
        OneHot::encode_with(text, &Alphabet::new(b"Nn"))
    }

    /// Encode a sequence with a custom set of ignored symbols. The ignore
    /// set must be disjoint from the alphabet; any symbol in neither is a
    /// validation error.
    pub fn encode_with(text: TextSlice, ignore: &Alphabet) -> Result<OneHot> {
        let alphabet = dna::alphabet();
        if !alphabet.is_disjoint(ignore) {
            let shared = ignore
                .symbols
                .iter()
                .find(|&s| alphabet.symbols.contains(s))
                .unwrap_or(0);
            return Err(Error::IgnoredAlphabetSymbol(shared as u8 as char));
        }

        let mut matrix = Array2::zeros((ALPHABET_LEN, text.len()));
        let mut ranks = Vec::with_capacity(text.len());
        for (j, &a) in text.iter().enumerate() {
            match dna::rank(a) {
                Some(r) => {
                    matrix[[r as usize, j]] = 1;
                    ranks.push(r);
                }
                None if ignore.is_word([a]) => ranks.push(IGNORED),
                None => return Err(Error::InvalidSymbol(a as char)),
            }
        }
        Ok(OneHot { matrix, ranks })
    }

    /// Sequence length in bases.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// The alphabet × length 0/1 matrix.
    pub fn matrix(&self) -> &Array2<u8> {
        &self.matrix
    }

    /// Per-position symbol ranks, [`IGNORED`] for skipped bases.
    pub fn ranks(&self) -> &[u8] {
        &self.ranks
    }

    /// The reverse complement of this sequence, still one-hot encoded.
    /// Ignored bases stay ignored.
    pub fn rev_comp(&self) -> OneHot {
        let ranks: Vec<u8> = self
            .ranks
            .iter()
            .rev()
            .map(|&r| if r == IGNORED { r } else { 3 - r })
            .collect();
        let mut matrix = Array2::zeros((ALPHABET_LEN, ranks.len()));
        for (j, &r) in ranks.iter().enumerate() {
            if r != IGNORED {
                matrix[[r as usize, j]] = 1;
            }
        }
        OneHot { matrix, ranks }
    }

    /// Decode back into text; ignored bases become `N`.
    pub fn decode(&self) -> String {
        self.ranks
            .iter()
            .map(|&r| {
                if r == IGNORED {
                    'N'
                } else {
                    dna::symbol(r) as char
                }
            })
            .collect()
    }

    /// The matrix as frequencies, e.g. for [`characters`].
    pub fn to_freqs(&self) -> Array2<f64> {
        self.matrix.mapv(f64::from)
    }
}

/// Extract the consensus sequence of a frequency matrix by taking the
/// argmax of every column. A tied column is an error unless `force` is
/// given, in which case the lowest-rank symbol wins.
///
/// ```
/// use memelite::motifs::{characters, Pwm};
/// use ndarray::array;
///
/// let pwm = Pwm::new(array![[0.7, 0.1], [0.1, 0.6], [0.1, 0.2], [0.1, 0.1]]).unwrap();
/// assert_eq!(characters(pwm.probs(), false).unwrap(), "AC");
/// ```
pub fn characters(matrix: &Array2<f64>, force: bool) -> Result<String> {
    if matrix.nrows() != ALPHABET_LEN {
        return Err(Error::InvalidAlphabetSize {
            expected: ALPHABET_LEN,
            got: matrix.nrows(),
        });
    }
    let mut consensus = String::with_capacity(matrix.ncols());
    for (j, col) in matrix.axis_iter(Axis(1)).enumerate() {
        let best = (0..ALPHABET_LEN)
            .max_by_key(|&a| OrderedFloat(col[a]))
            .unwrap_or(0);
        let ties = col.iter().filter(|&&v| v == col[best]).count();
        if ties > 1 && !force {
            return Err(Error::AmbiguousColumn(j));
        }
        // max_by_key returns the last maximum; pick the lowest rank instead
        let best = (0..ALPHABET_LEN).find(|&a| col[a] == col[best]).unwrap_or(best);
        consensus.push(dna::symbol(best as u8) as char);
    }
    Ok(consensus)
}
