//! Error types.
//!
//! - `EstimateError` is the typed, per-query failure produced by the library
//!   (aggregation + estimation). It never aborts the process.
//! - `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

/// Exit code for input/config/IO problems (missing file, bad header, ...).
pub const EXIT_INPUT: u8 = 2;
/// Exit code for a zone (or one of its bracket rows) not present in the table.
pub const EXIT_NOT_FOUND: u8 = 3;
/// Exit code for unusable count values.
pub const EXIT_MALFORMED: u8 = 4;
/// Exit code for mean/median that cannot be computed.
pub const EXIT_ESTIMATION: u8 = 5;

/// A failed query for a single zone.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// Zone absent from the table, or missing one of the six bracket rows.
    #[error("zone '{zone}' not found: {reason}")]
    NotFound { zone: String, reason: String },

    /// A count is non-numeric, non-finite or negative.
    #[error("malformed data for zone '{zone}', bracket {bracket}: {reason}")]
    MalformedData {
        zone: String,
        bracket: usize,
        reason: String,
    },

    /// Total return count is zero, so the mean is undefined.
    #[error("mean is undefined for zone '{zone}': total return count is {total}")]
    DivisionUndefined { zone: String, total: f64 },

    /// Median interpolation could not locate a usable bracket.
    #[error("median estimation failed for zone '{zone}': {reason}")]
    EstimationFailed { zone: String, reason: String },
}

impl EstimateError {
    /// Exit code the CLI uses when this error ends a run.
    pub fn exit_code(&self) -> u8 {
        match self {
            EstimateError::NotFound { .. } => EXIT_NOT_FOUND,
            EstimateError::MalformedData { .. } => EXIT_MALFORMED,
            EstimateError::DivisionUndefined { .. } | EstimateError::EstimationFailed { .. } => {
                EXIT_ESTIMATION
            }
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_error_maps_to_exit_codes() {
        let not_found = EstimateError::NotFound {
            zone: "1".to_string(),
            reason: "no rows".to_string(),
        };
        let app: AppError = not_found.into();
        assert_eq!(app.exit_code(), EXIT_NOT_FOUND);
        assert!(app.to_string().contains("zone '1' not found"));

        let div = EstimateError::DivisionUndefined {
            zone: "1".to_string(),
            total: 0.0,
        };
        assert_eq!(div.exit_code(), EXIT_ESTIMATION);
    }
}
