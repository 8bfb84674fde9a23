//! Bracket aggregation: one zone's six bracket counts out of a `ReturnTable`.

use log::debug;

use crate::domain::{BRACKET_COUNT, BracketRecord, BracketScheme};
use crate::error::EstimateError;
use crate::io::ingest::{ReturnTable, parse_zone_key};

/// Collect the bracket counts for `zone_id`.
///
/// `zone_id` is the user-facing text (e.g. `"98115"`); it must parse to the
/// table's integer zone key. Every bracket `1..=6` must be present and hold a
/// finite, non-negative number.
pub fn aggregate(
    zone_id: &str,
    table: &ReturnTable,
    scheme: BracketScheme,
) -> Result<BracketRecord, EstimateError> {
    let zone_text = zone_id.trim();
    let Some(zone) = parse_zone_key(zone_text) else {
        return Err(EstimateError::NotFound {
            zone: zone_text.to_string(),
            reason: "not a valid zone identifier".to_string(),
        });
    };

    if !table.contains_zone(zone) {
        return Err(EstimateError::NotFound {
            zone: zone_text.to_string(),
            reason: "no rows in the table".to_string(),
        });
    }

    let mut counts = [0.0; BRACKET_COUNT];
    for (idx, slot) in counts.iter_mut().enumerate() {
        let bracket = idx + 1;
        let cell = table
            .count_cell(zone, bracket)
            .ok_or_else(|| EstimateError::NotFound {
                zone: zone_text.to_string(),
                reason: format!("missing row for bracket {bracket}"),
            })?;
        *slot = parse_count(cell).map_err(|reason| EstimateError::MalformedData {
            zone: zone_text.to_string(),
            bracket,
            reason,
        })?;
    }

    let record = BracketRecord::new(zone_text, counts, scheme)?;
    debug!("zone {zone_text}: counts={:?} total={}", record.counts(), record.total());
    Ok(record)
}

fn parse_count(cell: &str) -> Result<f64, String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Err("missing count value".to_string());
    }
    let v = cell
        .parse::<f64>()
        .map_err(|_| format!("count '{cell}' is not numeric"))?;
    if !v.is_finite() {
        return Err(format!("count '{cell}' is not finite"));
    }
    if v < 0.0 {
        return Err(format!("count '{cell}' is negative"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_zone(zone: i64, counts: [&str; BRACKET_COUNT]) -> Vec<(i64, usize, String)> {
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| (zone, i + 1, c.to_string()))
            .collect()
    }

    #[test]
    fn aggregates_counts_in_bracket_order() {
        let counts = ["10", "20", "30", "40", "50", "60"];
        let table = ReturnTable::from_rows(full_zone(98115, counts));
        let rec = aggregate("98115", &table, BracketScheme::IRS_AGI).unwrap();
        assert_eq!(rec.counts(), &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
        assert!((rec.total() - 210.0).abs() < 1e-12);
        assert_eq!(rec.zone_id(), "98115");
    }

    #[test]
    fn zone_text_is_trimmed() {
        let table = ReturnTable::from_rows(full_zone(10001, ["1", "1", "1", "1", "1", "1"]));
        let rec = aggregate("  10001 ", &table, BracketScheme::IRS_AGI).unwrap();
        assert_eq!(rec.zone_id(), "10001");
    }

    #[test]
    fn absent_zone_is_not_found() {
        let table = ReturnTable::from_rows(full_zone(1, ["1", "1", "1", "1", "1", "1"]));
        let err = aggregate("2", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::NotFound { .. }));
    }

    #[test]
    fn non_numeric_zone_is_not_found() {
        let table = ReturnTable::from_rows(full_zone(1, ["1", "1", "1", "1", "1", "1"]));
        let err = aggregate("seattle", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::NotFound { ref zone, .. } if zone == "seattle"));
    }

    #[test]
    fn missing_bracket_row_is_not_found() {
        let mut rows = full_zone(5, ["1", "1", "1", "1", "1", "1"]);
        rows.remove(3);
        let table = ReturnTable::from_rows(rows);
        let err = aggregate("5", &table, BracketScheme::IRS_AGI).unwrap_err();
        match err {
            EstimateError::NotFound { reason, .. } => assert!(reason.contains("bracket 4")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_count_is_malformed() {
        let table = ReturnTable::from_rows(full_zone(7, ["1", "x", "1", "1", "1", "1"]));
        let err = aggregate("7", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 2, .. }));
    }

    #[test]
    fn negative_and_empty_counts_are_malformed() {
        let table = ReturnTable::from_rows(full_zone(7, ["1", "1", "-3", "1", "1", "1"]));
        let err = aggregate("7", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 3, .. }));

        let table = ReturnTable::from_rows(full_zone(8, ["1", "1", "1", "1", "1", ""]));
        let err = aggregate("8", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 6, .. }));

        let table = ReturnTable::from_rows(full_zone(9, ["1", "inf", "1", "1", "1", "1"]));
        let err = aggregate("9", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 2, .. }));

        let table = ReturnTable::from_rows(full_zone(10, ["NaN", "1", "1", "1", "1", "1"]));
        let err = aggregate("10", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 1, .. }));
    }

    #[test]
    fn overflowing_total_is_malformed() {
        let counts = ["1e308", "1e308", "0", "0", "0", "0"];
        let table = ReturnTable::from_rows(full_zone(11, counts));
        let err = aggregate("11", &table, BracketScheme::IRS_AGI).unwrap_err();
        assert!(matches!(err, EstimateError::MalformedData { bracket: 2, .. }));
    }

    #[test]
    fn float_counts_are_accepted() {
        let table = ReturnTable::from_rows(full_zone(9, ["1.5", "0", "0", "0", "0", "2e1"]));
        let rec = aggregate("9", &table, BracketScheme::IRS_AGI).unwrap();
        assert!((rec.total() - 21.5).abs() < 1e-12);
    }
}
