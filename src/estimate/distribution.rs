//! Mean and median estimation from bracketed return counts.
//!
//! Only the number of returns per bracket is known, so:
//!
//! - the mean weights each bracket's midpoint by its count
//! - the median assumes returns are spread uniformly inside the bracket that
//!   holds the middle-ranked return, and reads the income off a straight line
//!   between the bracket's boundaries
//!
//! ```text
//! income
//!   B[k+1] |            .
//!          |          .
//!   median |--------x
//!          |      . |
//!   B[k]   |____.   |
//!          +----+---+---+----> cumulative returns
//!              x1  rank x2
//! ```

use crate::domain::{BracketRecord, IncomeSummary};
use crate::error::EstimateError;

/// Value at `x0` on the line through `(x1, y1)` and `(x2, y2)`.
///
/// Returns `None` when `x1 == x2` (vertical line).
pub fn lin_approx(x1: f64, y1: f64, x2: f64, y2: f64, x0: f64) -> Option<f64> {
    let run = x2 - x1;
    if run == 0.0 {
        return None;
    }
    let slope = (y2 - y1) / run;
    Some(slope * (x0 - x1) + y1)
}

/// Midpoint-weighted mean income.
pub fn mean(record: &BracketRecord) -> Result<f64, EstimateError> {
    let total = record.total();
    if total <= 0.0 {
        return Err(EstimateError::DivisionUndefined {
            zone: record.zone_id().to_string(),
            total,
        });
    }

    let scheme = record.scheme();
    let numerator: f64 = record
        .counts()
        .iter()
        .enumerate()
        .map(|(idx, &count)| count * scheme.midpoint(idx))
        .sum();

    let value = numerator / total;
    if !value.is_finite() {
        return Err(EstimateError::EstimationFailed {
            zone: record.zone_id().to_string(),
            reason: format!("mean is not finite (total {total})"),
        });
    }
    Ok(value)
}

/// Median income by linear interpolation inside the median bracket.
///
/// The median rank is `floor(total / 2)`; the target bracket is the first one
/// whose cumulative count is strictly greater than that rank.
pub fn median(record: &BracketRecord) -> Result<f64, EstimateError> {
    let fail = |reason: String| EstimateError::EstimationFailed {
        zone: record.zone_id().to_string(),
        reason,
    };

    let boundaries = record.scheme().boundaries();
    let median_rank = (record.total() / 2.0).floor();

    let mut running_total = 0.0;
    for (k, &count) in record.counts().iter().enumerate() {
        running_total += count;
        if running_total <= median_rank {
            continue;
        }

        let x1 = running_total - count;
        let x2 = running_total;
        let y1 = boundaries[k];
        let y2 = boundaries[k + 1];

        let value = lin_approx(x1, y1, x2, y2, median_rank)
            .ok_or_else(|| fail(format!("bracket {} has zero width in count space", k + 1)))?;
        if !value.is_finite() {
            return Err(fail(format!("interpolation in bracket {} is not finite", k + 1)));
        }
        return Ok(value);
    }

    Err(fail(format!(
        "no bracket passes median rank {median_rank} (total {})",
        record.total()
    )))
}

/// Both statistics for one record.
pub fn summarize(record: &BracketRecord) -> Result<IncomeSummary, EstimateError> {
    Ok(IncomeSummary {
        mean: mean(record)?,
        median: median(record)?,
    })
}

/// Index (0-based) of the bracket holding the median-ranked return, if any.
///
/// Used by reports/TUI to highlight the bracket the median was read from.
pub fn median_bracket(record: &BracketRecord) -> Option<usize> {
    let median_rank = (record.total() / 2.0).floor();
    let mut running_total = 0.0;
    for (k, &count) in record.counts().iter().enumerate() {
        running_total += count;
        if running_total > median_rank {
            return Some(k);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::domain::{BRACKET_COUNT, BracketScheme};

    fn record(counts: [f64; BRACKET_COUNT]) -> BracketRecord {
        BracketRecord::new("00000", counts, BracketScheme::IRS_AGI).unwrap()
    }

    #[test]
    fn lin_approx_basic() {
        let y = lin_approx(0.0, 1.0, 10.0, 25_000.0, 5.0).unwrap();
        assert!((y - 12_500.5).abs() < 1e-9);
        assert!(lin_approx(3.0, 0.0, 3.0, 1.0, 3.0).is_none());
    }

    #[test]
    fn single_bottom_bracket() {
        let rec = record([10.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((mean(&rec).unwrap() - 12_500.0).abs() < 1e-9);
        assert!((median(&rec).unwrap() - 12_500.5).abs() < 1e-9);
    }

    #[test]
    fn empty_record_fails_both() {
        let rec = record([0.0; BRACKET_COUNT]);
        assert!(matches!(mean(&rec), Err(EstimateError::DivisionUndefined { .. })));
        assert!(matches!(median(&rec), Err(EstimateError::EstimationFailed { .. })));
        assert!(summarize(&rec).is_err());
        assert_eq!(median_bracket(&rec), None);
    }

    #[test]
    fn median_on_bracket_edge() {
        let rec = record([5.0, 5.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((median(&rec).unwrap() - 25_000.0).abs() < 1e-9);
        assert_eq!(median_bracket(&rec), Some(1));
    }

    #[test]
    fn odd_total_uses_floor_rank() {
        // total 11 -> rank 5; bracket 0 holds 4, bracket 1 holds 7.
        let rec = record([4.0, 7.0, 0.0, 0.0, 0.0, 0.0]);
        let expected = (50_000.0 - 25_000.0) / 7.0 * (5.0 - 4.0) + 25_000.0;
        assert!((median(&rec).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn top_bracket_interpolates_to_ceiling() {
        let rec = record([0.0, 0.0, 0.0, 0.0, 0.0, 4.0]);
        let expected = (10_000_000.0 - 200_000.0) / 4.0 * 2.0 + 200_000.0;
        assert!((median(&rec).unwrap() - expected).abs() < 1e-6);
        assert!((mean(&rec).unwrap() - 5_100_000.0).abs() < 1e-6);
    }

    #[test]
    fn mixed_counts_mean() {
        let rec = record([1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let expected = ((1.0 + 24_999.0) / 2.0 + (25_000.0 + 49_999.0) / 2.0) / 2.0;
        assert!((mean(&rec).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn single_bracket_mass_stays_in_bracket() {
        let scheme = BracketScheme::IRS_AGI;
        for k in 0..BRACKET_COUNT {
            let mut counts = [0.0; BRACKET_COUNT];
            counts[k] = 37.0;
            let rec = record(counts);
            let m = mean(&rec).unwrap();
            let med = median(&rec).unwrap();
            assert!(
                m >= scheme.lower[k] && m <= scheme.upper[k],
                "mean {m} outside bracket {k}"
            );
            assert!(
                med >= scheme.lower[k] && med <= scheme.upper[k],
                "median {med} outside bracket {k}"
            );
        }
    }

    #[test]
    fn random_records_stay_within_scheme_bounds() {
        let scheme = BracketScheme::IRS_AGI;
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2_000 {
            let mut counts = [0.0; BRACKET_COUNT];
            for c in counts.iter_mut() {
                // Leave some brackets empty to exercise gaps.
                *c = if rng.gen_bool(0.3) { 0.0 } else { rng.gen_range(0..5_000) as f64 };
            }
            let rec = record(counts);
            if rec.total() <= 0.0 {
                continue;
            }

            let m = mean(&rec).unwrap();
            assert!(m.is_finite());
            assert!(m >= scheme.floor() && m <= scheme.ceiling());

            let med = median(&rec).unwrap();
            assert!(med >= scheme.floor() && med <= scheme.ceiling());

            // Same immutable record, same answers.
            assert_eq!(mean(&rec).unwrap().to_bits(), m.to_bits());
            assert_eq!(median(&rec).unwrap().to_bits(), med.to_bits());
        }
    }

    #[test]
    fn overflowing_weighted_sum_fails_mean() {
        // Total stays finite, but count * midpoint does not.
        let rec = record([8e307, 8e307, 0.0, 0.0, 0.0, 0.0]);
        assert!(rec.total().is_finite());
        assert!(matches!(mean(&rec), Err(EstimateError::EstimationFailed { .. })));
        assert!(summarize(&rec).is_err());
    }

    #[test]
    fn overflowing_total_never_reaches_estimator() {
        let counts = [1e308, 1e308, 0.0, 0.0, 0.0, 0.0];
        let err = BracketRecord::new("1", counts, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 2, .. }));
    }

    #[test]
    fn summarize_combines_both() {
        let rec = record([10.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let s = summarize(&rec).unwrap();
        assert!((s.mean - 12_500.0).abs() < 1e-9);
        assert!((s.median - 12_500.5).abs() < 1e-9);
    }
}
