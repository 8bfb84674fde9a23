//! Formatted terminal output: currency, per-zone lines, bracket tables, JSON.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized

use serde::Serialize;

use crate::app::pipeline::ZoneReport;
use crate::domain::BRACKET_COUNT;
use crate::error::{AppError, EXIT_INPUT, EstimateError};
use crate::io::ingest::{LoadStats, RowError};

/// Currency with cents and thousands separators, e.g. `$53,214.77`.
pub fn format_currency(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let sign = if v < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", v.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Currency rounded to whole dollars, e.g. `$200,000`.
pub fn format_currency_whole(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let sign = if v < 0.0 { "-" } else { "" };
    let whole = format!("{:.0}", v.abs());
    format!("{sign}${}", group_thousands(&whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One-line result for a zone.
pub fn format_zone_line(report: &ZoneReport) -> String {
    format!(
        "The zipcode: {} has mean income: {} and median income {}.",
        report.zone_id(),
        format_currency(report.summary.mean),
        format_currency(report.summary.median),
    )
}

/// Bracket table for a zone: counts, share, cumulative share.
///
/// The bracket the median was interpolated in is marked with `*`.
pub fn format_breakdown(report: &ZoneReport) -> String {
    let record = &report.record;
    let scheme = record.scheme();
    let total = record.total();

    let mut out = String::new();
    out.push_str(
        format!(
            "  {:<3} {:<26} {:>12} {:>8} {:>8}",
            "#", "range", "returns", "share", "cum"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("  {:-<3} {:-<26} {:-<12} {:-<8} {:-<8}", "", "", "", "", "").trim_end());
    out.push('\n');

    let mut running = 0.0;
    for idx in 0..BRACKET_COUNT {
        let count = record.counts()[idx];
        running += count;
        let marker = if report.median_bracket == Some(idx) { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<3} {:<26} {:>12} {:>7.1}% {:>7.1}%\n",
            idx + 1,
            scheme.label(idx),
            format_count(count),
            pct(count, total),
            pct(running, total),
        ));
    }
    out.push_str(&format!("  total returns: {}\n", format_count(total)));
    out
}

fn format_count(v: f64) -> String {
    if v.fract() == 0.0 {
        group_thousands(&format!("{v:.0}"))
    } else {
        format!("{v:.2}")
    }
}

fn pct(part: f64, total: f64) -> f64 {
    if total > 0.0 { 100.0 * part / total } else { 0.0 }
}

/// Summary of the loaded table (for `-v` output).
pub fn format_load_summary(stats: &LoadStats, row_errors: &[RowError]) -> String {
    let mut out = format!(
        "Table: rows_read={} rows_used={} zones={} duplicates={} skipped={}",
        stats.rows_read,
        stats.rows_used,
        stats.zones,
        stats.duplicates,
        row_errors.len(),
    );
    for err in row_errors.iter().take(5) {
        out.push_str(&format!("\n  line {}: {}", err.line, err.message));
    }
    if row_errors.len() > 5 {
        out.push_str(&format!("\n  ... and {} more", row_errors.len() - 5));
    }
    out
}

/// JSON shape of one query result.
#[derive(Debug, Serialize)]
pub struct QueryOutcome<'a> {
    pub zone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<[f64; BRACKET_COUNT]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> QueryOutcome<'a> {
    pub fn new(zone: &'a str, result: &Result<ZoneReport, EstimateError>) -> Self {
        match result {
            Ok(report) => Self {
                zone,
                mean: Some(report.summary.mean),
                median: Some(report.summary.median),
                mean_display: Some(format_currency(report.summary.mean)),
                median_display: Some(format_currency(report.summary.median)),
                counts: Some(*report.record.counts()),
                total: Some(report.record.total()),
                error: None,
            },
            Err(err) => Self {
                zone,
                mean: None,
                median: None,
                mean_display: None,
                median_display: None,
                counts: None,
                total: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Pretty JSON array of query outcomes, one per requested zone.
pub fn format_json(
    zone_ids: &[String],
    results: &[Result<ZoneReport, EstimateError>],
) -> Result<String, AppError> {
    let outcomes: Vec<QueryOutcome<'_>> = zone_ids
        .iter()
        .zip(results)
        .map(|(zone, result)| QueryOutcome::new(zone.trim(), result))
        .collect();
    serde_json::to_string_pretty(&outcomes)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to encode JSON output: {e}")))
}
