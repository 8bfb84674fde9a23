//! Reporting utilities: currency formatting, per-zone text, JSON output.

pub mod format;

pub use format::*;
