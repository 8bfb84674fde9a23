//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed bracket definitions (`BracketScheme`)
//! - per-zone bracket counts (`BracketRecord`)
//! - estimation outputs (`IncomeSummary`)

pub mod types;

pub use types::*;
