//! `agi-income` library crate.
//!
//! The binary (`agi`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimator can be reused by other front-ends against a loaded table
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod estimate;
pub mod io;
pub mod report;
pub mod tui;
