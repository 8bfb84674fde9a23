//! Income estimation from bracketed return counts.
//!
//! - `aggregate`: table + zone -> `BracketRecord`
//! - `distribution`: `BracketRecord` -> mean / median

pub mod aggregate;
pub mod distribution;

pub use aggregate::aggregate;
pub use distribution::{lin_approx, mean, median, median_bracket, summarize};
