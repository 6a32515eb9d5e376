// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Minimal MEME text format support.
//!
//! The reader recognizes the line types of MEME motif databases: the
//! version header, an optional `ALPHABET=` line (which must spell `ACGT`),
//! strand and background lines (informational only; the algorithms assume
//! a uniform background regardless), and `MOTIF` blocks. Within a block
//! the `w=` field of the `letter-probability matrix:` line is
//! authoritative; blocks whose matrix fails to parse are skipped silently
//! and reading continues with the next block.
//!
//! # Example
//!
//! ```
//! use memelite::io::meme;
//!
//! let text = "\
//! MEME version 4
//!
//! MOTIF TEST_TF
//! letter-probability matrix: alength= 4 w= 2 nsites= 20 E= 0
//!  0.800000 0.100000 0.050000 0.050000
//!  0.100000 0.700000 0.100000 0.100000
//! ";
//! let motifs = meme::read(text, None).unwrap();
//! assert_eq!(motifs.len(), 1);
//! assert_eq!(motifs[0].name, "TEST_TF");
//! assert_eq!(motifs[0].pwm.width(), 2);
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use itertools::Itertools;

use crate::errors::{Error, Result};
use crate::motifs::{Motif, Pwm};

// the matrix header must appear within this many lines of the MOTIF line
const HEADER_WINDOW: usize = 10;

/// Errors of readers that pull MEME text from an `io::Read`.
#[derive(thiserror::Error, Debug)]
pub enum MemeError {
    #[error(transparent)]
    Parse(#[from] Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parse motifs out of MEME text, in file order. `max_motifs` caps the
/// number of successfully parsed motifs.
pub fn read(text: &str, max_motifs: Option<usize>) -> Result<Vec<Motif>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut motifs = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if let Some(max) = max_motifs {
            if motifs.len() >= max {
                break;
            }
        }
        let line = lines[i];
        if let Some(rest) = line.strip_prefix("ALPHABET=") {
            let alphabet = rest.trim();
            if alphabet != "ACGT" {
                return Err(Error::UnsupportedAlphabet(alphabet.to_string()));
            }
            i += 1;
        } else if line.starts_with("MOTIF") {
            let name = lines[i]["MOTIF".len()..].trim().to_string();
            match parse_block(&lines, i + 1) {
                Some((pwm, next)) => {
                    motifs.push(Motif::new(name, pwm));
                    i = next;
                }
                // bad block: drop it, keep reading right after its MOTIF line
                None => i += 1,
            }
        } else {
            i += 1;
        }
    }
    Ok(motifs)
}

// Parse one motif block starting right after its MOTIF line. Returns the
// PWM and the index of the first unconsumed line, or None if the block is
// malformed.
fn parse_block(lines: &[&str], start: usize) -> Option<(Pwm, usize)> {
    // locate the matrix header
    let mut header = None;
    for (i, line) in lines
        .iter()
        .enumerate()
        .skip(start)
        .take(HEADER_WINDOW)
    {
        if line.starts_with("MOTIF") {
            return None;
        }
        if line.starts_with("letter-probability matrix:") {
            header = Some((i, parse_width(line)?));
            break;
        }
    }
    let (header_idx, width) = header?;
    if width == 0 {
        return None;
    }

    // collect exactly `width` numeric rows, skipping other lines
    let mut rows = Vec::with_capacity(width);
    let mut i = header_idx + 1;
    while rows.len() < width {
        let line = lines.get(i)?;
        if line.starts_with("MOTIF") {
            return None;
        }
        if let Some(values) = parse_floats(line) {
            rows.push(values);
        }
        i += 1;
    }

    // rows are position-major; a wrong row width fails the whole block
    Pwm::from_rows(&rows).ok().map(|pwm| (pwm, i))
}

// Extract the value of the `w=` field.
fn parse_width(line: &str) -> Option<usize> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "w=" {
            return tokens.next()?.parse().ok();
        }
        if let Some(value) = token.strip_prefix("w=") {
            return value.parse().ok();
        }
    }
    None
}

// A line of whitespace-separated finite floats, or None.
fn parse_floats(line: &str) -> Option<Vec<f64>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    tokens
        .iter()
        .map(|t| t.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}

/// Render motifs as MEME text. The output always declares the uniform
/// background and both strands, matching what the scanners assume.
pub fn write(motifs: &[Motif]) -> String {
    let mut out = String::new();
    out.push_str("MEME version 4\n\n");
    out.push_str("ALPHABET= ACGT\n\n");
    out.push_str("strands: + -\n\n");
    out.push_str("Background letter frequencies\n");
    out.push_str("A 0.25 C 0.25 G 0.25 T 0.25\n\n");
    for motif in motifs {
        let w = motif.pwm.width();
        out.push_str(&format!("MOTIF {}\n", motif.name));
        out.push_str(&format!(
            "letter-probability matrix: alength= 4 w= {} nsites= 20 E= 0\n",
            w
        ));
        for j in 0..w {
            let row = (0..4)
                .map(|a| format!("{:.6}", motif.pwm.probs()[[a, j]]))
                .join(" ");
            out.push_str(&format!(" {}\n", row));
        }
        out.push('\n');
    }
    out
}

/// A MEME reader over any `io::Read`.
pub struct Reader<R: Read> {
    reader: R,
}

impl Reader<fs::File> {
    /// Read from a file at the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        fs::File::open(path).map(Reader::new)
    }
}

impl<R: Read> Reader<R> {
    pub fn new(reader: R) -> Self {
        Reader { reader }
    }

    /// Consume the reader and parse all motifs.
    pub fn motifs(mut self, max_motifs: Option<usize>) -> std::result::Result<Vec<Motif>, MemeError> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text)?;
        Ok(read(&text, max_motifs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    const SAMPLE: &str = "\
MEME version 4

ALPHABET= ACGT

strands: + -

Background letter frequencies
A 0.25 C 0.25 G 0.25 T 0.25

MOTIF TEST_TF
letter-probability matrix: alength= 4 w= 3 nsites= 20 E= 0
 0.800000 0.100000 0.050000 0.050000
 0.100000 0.700000 0.100000 0.100000
 0.100000 0.200000 0.600000 0.100000
URL http://example.com/TEST_TF
";

    #[test]
    fn test_parse_sample_block() {
        let motifs = read(SAMPLE, None).unwrap();
        assert_eq!(motifs.len(), 1);
        assert_eq!(motifs[0].name, "TEST_TF");
        let pwm = &motifs[0].pwm;
        assert_eq!(pwm.width(), 3);
        // row 0 holds the A probabilities across positions
        assert_eq!(pwm.probs().row(0).to_vec(), vec![0.8, 0.1, 0.1]);
    }

    #[test]
    fn test_width_field_is_authoritative() {
        let text = "\
MOTIF wide
letter-probability matrix: alength= 4 w= 1 nsites= 20 E= 0
 0.25 0.25 0.25 0.25
 0.25 0.25 0.25 0.25
";
        let motifs = read(text, None).unwrap();
        assert_eq!(motifs[0].pwm.width(), 1);
    }

    #[test]
    fn test_bad_block_is_skipped_silently() {
        let text = "\
MOTIF broken
letter-probability matrix: alength= 4 w= 2 nsites= 20 E= 0
 0.5 0.5 0.0
 0.25 0.25 0.25 0.25

MOTIF fine
letter-probability matrix: alength= 4 w= 1 nsites= 20 E= 0
 0.25 0.25 0.25 0.25
";
        let motifs = read(text, None).unwrap();
        assert_eq!(motifs.len(), 1);
        assert_eq!(motifs[0].name, "fine");
    }

    #[test]
    fn test_truncated_block_is_skipped() {
        let text = "\
MOTIF truncated
letter-probability matrix: alength= 4 w= 3 nsites= 20 E= 0
 0.25 0.25 0.25 0.25
";
        assert!(read(text, None).unwrap().is_empty());
    }

    #[test]
    fn test_missing_header_is_skipped() {
        let text = "MOTIF headless\nno matrix here\n";
        assert!(read(text, None).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_alphabet_is_fatal() {
        let text = "ALPHABET= ACGU\n";
        assert_eq!(
            read(text, None),
            Err(Error::UnsupportedAlphabet("ACGU".to_string()))
        );
    }

    #[test]
    fn test_max_motifs_cap() {
        let motifs = vec![
            Motif::new("a", Pwm::uniform(2).unwrap()),
            Motif::new("b", Pwm::uniform(3).unwrap()),
            Motif::new("c", Pwm::uniform(1).unwrap()),
        ];
        let text = write(&motifs);
        let capped = read(&text, Some(2)).unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[1].name, "b");
    }

    #[test]
    fn test_roundtrip_preserves_order_and_values() {
        let motifs = vec![
            Motif::new(
                "first",
                Pwm::new(array![
                    [0.812345, 0.1],
                    [0.1, 0.7],
                    [0.05, 0.15],
                    [0.037655, 0.05],
                ])
                .unwrap(),
            ),
            Motif::new("second", Pwm::uniform(4).unwrap()),
        ];
        let parsed = read(&write(&motifs), None).unwrap();
        assert_eq!(parsed.len(), motifs.len());
        for (expected, got) in motifs.iter().zip(&parsed) {
            assert_eq!(expected.name, got.name);
            assert_eq!(expected.pwm.width(), got.pwm.width());
            for (&x, &y) in expected.pwm.probs().iter().zip(got.pwm.probs().iter()) {
                assert_relative_eq!(x, y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_reader_over_bytes() {
        let motifs = Reader::new(SAMPLE.as_bytes()).motifs(None).unwrap();
        assert_eq!(motifs.len(), 1);
    }
}
