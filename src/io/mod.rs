//! Input helpers.
//!
//! - CSV ingest into an immutable `ReturnTable` (`ingest`)

pub mod ingest;

pub use ingest::*;
