// Copyright 2024 The memelite developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Numerical machinery shared by the scanning and comparison algorithms:
//! log2-space probability arithmetic, an O(N) approximate weighted median,
//! and exact discretized score distributions.

pub mod log2probs;
pub mod median;
pub mod scoredist;

pub use self::log2probs::log2_add_exp;
pub use self::median::binned_median;
pub use self::scoredist::ScoreDist;
