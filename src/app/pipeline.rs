//! Shared query pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! zone text -> bracket aggregation -> mean/median estimation
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use log::{debug, warn};
use rayon::prelude::*;

use crate::domain::{BracketRecord, BracketScheme, IncomeSummary};
use crate::error::EstimateError;
use crate::estimate::{aggregate, median_bracket, summarize};
use crate::io::ingest::ReturnTable;

/// All computed outputs of a single zone query.
#[derive(Debug, Clone)]
pub struct ZoneReport {
    pub record: BracketRecord,
    pub summary: IncomeSummary,
    /// 0-based index of the bracket the median was interpolated in.
    pub median_bracket: Option<usize>,
}

impl ZoneReport {
    pub fn zone_id(&self) -> &str {
        self.record.zone_id()
    }
}

/// Estimate mean and median income for one zone.
pub fn run_query(zone_id: &str, table: &ReturnTable) -> Result<ZoneReport, EstimateError> {
    let record = aggregate(zone_id, table, BracketScheme::IRS_AGI)?;
    let summary = summarize(&record)?;
    let median_bracket = median_bracket(&record);
    debug!(
        "zone {}: mean={:.2} median={:.2}",
        record.zone_id(),
        summary.mean,
        summary.median
    );
    Ok(ZoneReport {
        record,
        summary,
        median_bracket,
    })
}

/// Run independent queries for many zones in parallel.
///
/// The table is shared read-only; results come back in input order.
pub fn run_batch(
    zone_ids: &[String],
    table: &ReturnTable,
) -> Vec<Result<ZoneReport, EstimateError>> {
    zone_ids
        .par_iter()
        .map(|zone| {
            let result = run_query(zone, table);
            if let Err(err) = &result {
                warn!("{err}");
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReturnTable {
        let mut rows = Vec::new();
        for (b, c) in [10, 0, 0, 0, 0, 0].iter().enumerate() {
            rows.push((1_i64, b + 1, c.to_string()));
        }
        for (b, c) in [5, 5, 0, 0, 0, 0].iter().enumerate() {
            rows.push((2_i64, b + 1, c.to_string()));
        }
        for b in 1..=6 {
            rows.push((3_i64, b, "0".to_string()));
        }
        ReturnTable::from_rows(rows)
    }

    #[test]
    fn query_returns_summary_and_median_bracket() {
        let report = run_query("1", &table()).unwrap();
        assert_eq!(report.zone_id(), "1");
        assert!((report.summary.mean - 12_500.0).abs() < 1e-9);
        assert!((report.summary.median - 12_500.5).abs() < 1e-9);
        assert_eq!(report.median_bracket, Some(0));
    }

    #[test]
    fn zero_total_zone_fails_with_division_undefined() {
        let err = run_query("3", &table()).unwrap_err();
        assert!(matches!(err, EstimateError::DivisionUndefined { .. }));
    }

    #[test]
    fn batch_preserves_order_and_isolates_failures() {
        let zones: Vec<String> = ["2", "404", "1"].iter().map(|s| s.to_string()).collect();
        let results = run_batch(&zones, &table());
        assert_eq!(results.len(), 3);
        assert!((results[0].as_ref().unwrap().summary.median - 25_000.0).abs() < 1e-9);
        assert!(matches!(results[1], Err(EstimateError::NotFound { .. })));
        assert_eq!(results[2].as_ref().unwrap().zone_id(), "1");
    }
}
