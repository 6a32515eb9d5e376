// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! # memelite, a lightweight motif analysis library for Rust.
//!
//! This library provides the numerical core of sequence motif analysis:
//! FIMO-style scanning of sequences for motif instances, TOMTOM-style
//! comparison of motifs against each other, and the discretized score
//! distribution machinery both algorithms derive their p-values from.
//! Motifs travel as position weight matrices, typically parsed from MEME
//! text files.
//!
//! All algorithms are purely synchronous and keep no state across calls;
//! derived per-motif tables are held by the scanner/aligner objects and
//! can be reused over any number of inputs.
//!
//! # Example: scan sequences for a motif
//!
//! ```
//! use memelite::io::meme;
//! use memelite::pattern_matching::fimo::{fimo, FimoOptions};
//!
//! let text = "\
//! MEME version 4
//!
//! MOTIF TEST_TF
//! letter-probability matrix: alength= 4 w= 3 nsites= 20 E= 0
//!  0.800000 0.100000 0.050000 0.050000
//!  0.100000 0.700000 0.100000 0.100000
//!  0.100000 0.200000 0.600000 0.100000
//! ";
//! let motifs = meme::read(text, None).unwrap();
//! let opts = FimoOptions {
//!     threshold: 0.5,
//!     ..FimoOptions::default()
//! };
//! let results = fimo(&motifs, &[b"TTACGTTT"], opts).unwrap();
//! assert_eq!(results[0].motif_name, "TEST_TF");
//! assert!(results[0].hits.iter().any(|h| h.start == 2));
//! ```
//!
//! # Example: compare two motif collections
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
//! ```

pub mod alphabets;
pub mod errors;
pub mod io;
pub mod motif_comparison;
pub mod motifs;
pub mod pattern_matching;
pub mod stats;
pub mod utils;

pub use crate::errors::{Error, Result};
