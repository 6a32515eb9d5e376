// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Error definitions for the whole crate.
//!
//! All validation failures surface as [`Error`]. Data that is merely outside
//! an algorithm's interest (e.g. a MEME block whose matrix does not parse) is
//! skipped silently instead and never reaches this enum.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("unknown symbol {0:?} in sequence")]
    InvalidSymbol(char),
    #[error("ignore set contains alphabet symbol {0:?}")]
    IgnoredAlphabetSymbol(char),
    #[error("consensus is ambiguous at column {0}; pass force=true to break ties")]
    AmbiguousColumn(usize),
    #[error("matrix must have {expected} rows, one per alphabet symbol, got {got}")]
    InvalidAlphabetSize { expected: usize, got: usize },
    #[error("motif width must be at least 1")]
    EmptyMotif,
    #[error("bin size must be positive, got {0}")]
    InvalidBinSize(f64),
    #[error("matrix row has {got} entries, expected {expected}")]
    RowWidthMismatch { expected: usize, got: usize },
    #[error("unsupported alphabet {0:?}, expected ACGT")]
    UnsupportedAlphabet(String),
}

pub type Result<T> = std::result::Result<T, Error>;
