//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed between the aggregator and the estimator
//! - printed as text or JSON by the CLI
//! - rendered by the TUI

use serde::Serialize;

use crate::error::EstimateError;

/// Number of AGI brackets in the IRS zip-code tables.
pub const BRACKET_COUNT: usize = 6;

/// Fixed income bracket definitions.
///
/// Bracket `i` covers `[lower[i], upper[i]]`. The boundary sequence used for
/// median interpolation is the six lower bounds followed by the ceiling of the
/// last bracket, so bracket `i` spans `boundaries[i]..boundaries[i + 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketScheme {
    pub lower: [f64; BRACKET_COUNT],
    pub upper: [f64; BRACKET_COUNT],
}

impl BracketScheme {
    /// IRS individual income tax statistics, `agi_stub` 1..=6.
    pub const IRS_AGI: BracketScheme = BracketScheme {
        lower: [1.0, 25_000.0, 50_000.0, 75_000.0, 100_000.0, 200_000.0],
        upper: [24_999.0, 49_999.0, 74_999.0, 99_999.0, 199_999.0, 10_000_000.0],
    };

    /// Midpoint of bracket `idx` (0-based).
    pub fn midpoint(&self, idx: usize) -> f64 {
        (self.lower[idx] + self.upper[idx]) / 2.0
    }

    /// Interpolation boundaries: every lower bound plus the last upper bound.
    pub fn boundaries(&self) -> [f64; BRACKET_COUNT + 1] {
        let mut out = [0.0; BRACKET_COUNT + 1];
        out[..BRACKET_COUNT].copy_from_slice(&self.lower);
        out[BRACKET_COUNT] = self.upper[BRACKET_COUNT - 1];
        out
    }

    /// Lowest income the scheme can represent.
    pub fn floor(&self) -> f64 {
        self.lower[0]
    }

    /// Highest income the scheme can represent.
    pub fn ceiling(&self) -> f64 {
        self.upper[BRACKET_COUNT - 1]
    }

    /// Short label such as `$25,000 - $49,999` for bracket `idx`.
    pub fn label(&self, idx: usize) -> String {
        format!(
            "{} - {}",
            crate::report::format_currency_whole(self.lower[idx]),
            crate::report::format_currency_whole(self.upper[idx]),
        )
    }
}

impl Default for BracketScheme {
    fn default() -> Self {
        Self::IRS_AGI
    }
}

/// Return counts for one zone, one entry per bracket.
///
/// Built once per query and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketRecord {
    zone_id: String,
    counts: [f64; BRACKET_COUNT],
    total: f64,
    #[serde(skip)]
    scheme: BracketScheme,
}

impl BracketRecord {
    /// Build a record, validating every count and computing the total.
    ///
    /// A zero total is accepted here; it is the estimator that rejects it.
    /// Counts whose sum overflows to infinity are rejected.
    pub fn new(
        zone_id: impl Into<String>,
        counts: [f64; BRACKET_COUNT],
        scheme: BracketScheme,
    ) -> Result<Self, EstimateError> {
        let zone_id = zone_id.into();
        let mut total = 0.0;
        for (idx, &count) in counts.iter().enumerate() {
            if !count.is_finite() || count < 0.0 {
                return Err(EstimateError::MalformedData {
                    zone: zone_id,
                    bracket: idx + 1,
                    reason: format!("count must be finite and >= 0 (got {count})"),
                });
            }
            total += count;
            if !total.is_finite() {
                return Err(EstimateError::MalformedData {
                    zone: zone_id,
                    bracket: idx + 1,
                    reason: "total return count overflows".to_string(),
                });
            }
        }
        Ok(Self {
            zone_id,
            counts,
            total,
            scheme,
        })
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn counts(&self) -> &[f64; BRACKET_COUNT] {
        &self.counts
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn scheme(&self) -> &BracketScheme {
        &self.scheme
    }

    pub fn lower_bounds(&self) -> &[f64; BRACKET_COUNT] {
        &self.scheme.lower
    }

    pub fn upper_bounds(&self) -> &[f64; BRACKET_COUNT] {
        &self.scheme.upper
    }
}

/// Mean and median income estimated for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeSummary {
    pub mean: f64,
    pub median: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_append_ceiling() {
        let b = BracketScheme::IRS_AGI.boundaries();
        assert_eq!(
            b,
            [1.0, 25_000.0, 50_000.0, 75_000.0, 100_000.0, 200_000.0, 10_000_000.0]
        );
    }

    #[test]
    fn record_total_is_sum_of_counts() {
        let counts = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let rec = BracketRecord::new("98115", counts, BracketScheme::IRS_AGI).unwrap();
        assert!((rec.total() - 21.0).abs() < 1e-12);
        assert_eq!(rec.zone_id(), "98115");
    }

    #[test]
    fn record_rejects_negative_count() {
        let counts = [1.0, -2.0, 0.0, 0.0, 0.0, 0.0];
        let err = BracketRecord::new("1", counts, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 2, .. }));
    }

    #[test]
    fn record_rejects_overflowing_total() {
        let counts = [1e308, 1e308, 0.0, 0.0, 0.0, 0.0];
        let err = BracketRecord::new("1", counts, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 2, .. }));
    }

    #[test]
    fn label_uses_whole_dollars() {
        assert_eq!(BracketScheme::IRS_AGI.label(1), "$25,000 - $49,999");
    }
}
