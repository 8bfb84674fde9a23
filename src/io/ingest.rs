//! CSV ingest for the IRS zip-code AGI table.
//!
//! This module turns a return-count CSV into a `ReturnTable`: an immutable,
//! in-memory lookup from `(zone, bracket)` to the raw count text.
//!
//! Design goals:
//! - **Strict schema** for the three required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip rows with an unusable key, but report them)
//! - **Lazy count parsing**: a bad count only fails queries for its own zone
//! - **No hidden caching**: callers load once and pass `&ReturnTable` around

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use log::{debug, info};

use crate::domain::BRACKET_COUNT;
use crate::error::{AppError, EXIT_INPUT};

/// Names of the columns the table is built from.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub zone: String,
    pub bracket: String,
    pub count: String,
}

impl ColumnSpec {
    pub fn new(
        zone: impl Into<String>,
        bracket: impl Into<String>,
        count: impl Into<String>,
    ) -> Self {
        Self {
            zone: zone.into(),
            bracket: bracket.into(),
            count: count.into(),
        }
    }
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::new("zipcode", "agi_stub", "N1")
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Summary of what the loader kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_used: usize,
    pub zones: usize,
    /// Rows whose `(zone, bracket)` pair was already seen. The first one wins.
    pub duplicates: usize,
}

/// Raw count cells for one zone, indexed by `bracket - 1`.
type ZoneCells = [Option<String>; BRACKET_COUNT];

/// Read-only return-count table keyed by zone and bracket.
#[derive(Debug, Clone, Default)]
pub struct ReturnTable {
    zones: HashMap<i64, ZoneCells>,
    row_errors: Vec<RowError>,
    stats: LoadStats,
}

impl ReturnTable {
    /// Load a table from a CSV file.
    pub fn load(path: &Path, columns: &ColumnSpec) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(
                EXIT_INPUT,
                format!("Failed to open CSV '{}': {e}", path.display()),
            )
        })?;

        let table = Self::from_reader(file, columns)?;
        info!(
            "loaded '{}': rows_read={} rows_used={} zones={} duplicates={} row_errors={}",
            path.display(),
            table.stats.rows_read,
            table.stats.rows_used,
            table.stats.zones,
            table.stats.duplicates,
            table.row_errors.len(),
        );
        Ok(table)
    }

    /// Build a table from any CSV byte stream.
    pub fn from_reader<R: Read>(reader: R, columns: &ColumnSpec) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV headers: {e}")))?
            .clone();
        let header_map = build_header_map(&headers);

        let zone_idx = require_column(&header_map, &columns.zone)?;
        let bracket_idx = require_column(&header_map, &columns.bracket)?;
        let count_idx = require_column(&header_map, &columns.count)?;

        let mut table = ReturnTable::default();

        for (idx, result) in reader.records().enumerate() {
            // +2 because:
            // - records() starts at line 1 after headers
            // - CSV is 1-based line numbers
            let line = idx + 2;
            table.stats.rows_read += 1;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    table.push_row_error(line, format!("CSV parse error: {e}"));
                    continue;
                }
            };

            let Some(zone) = record.get(zone_idx).and_then(parse_zone_key) else {
                table.push_row_error(line, format!("Invalid `{}` value.", columns.zone));
                continue;
            };

            let bracket = match record.get(bracket_idx).and_then(parse_integer) {
                Some(b) if (1..=BRACKET_COUNT as i64).contains(&b) => b as usize,
                _ => {
                    let message = format!(
                        "Invalid `{}` value (expected 1-{BRACKET_COUNT}).",
                        columns.bracket
                    );
                    table.push_row_error(line, message);
                    continue;
                }
            };

            let count = record.get(count_idx).unwrap_or("").to_string();
            table.insert(zone, bracket, count);
        }

        table.stats.zones = table.zones.len();
        Ok(table)
    }

    /// Build a table from `(zone, bracket, count)` triples.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (i64, usize, S)>,
        S: Into<String>,
    {
        let mut table = ReturnTable::default();
        for (zone, bracket, count) in rows {
            table.stats.rows_read += 1;
            if !(1..=BRACKET_COUNT).contains(&bracket) {
                let line = table.stats.rows_read;
                table.push_row_error(
                    line,
                    format!("Bracket {bracket} is outside 1-{BRACKET_COUNT}."),
                );
                continue;
            }
            table.insert(zone, bracket, count.into());
        }
        table.stats.zones = table.zones.len();
        table
    }

    fn insert(&mut self, zone: i64, bracket: usize, count: String) {
        let cells = self.zones.entry(zone).or_default();
        match &mut cells[bracket - 1] {
            Some(_) => {
                self.stats.duplicates += 1;
                debug!("duplicate row for zone {zone}, bracket {bracket}; keeping the first");
            }
            slot => {
                *slot = Some(count);
                self.stats.rows_used += 1;
            }
        }
    }

    fn push_row_error(&mut self, line: usize, message: String) {
        debug!("skipping line {line}: {message}");
        self.row_errors.push(RowError { line, message });
    }

    /// Whether any row exists for `zone`.
    pub fn contains_zone(&self, zone: i64) -> bool {
        self.zones.contains_key(&zone)
    }

    /// Raw count text for `(zone, bracket)`, with `bracket` in `1..=6`.
    pub fn count_cell(&self, zone: i64, bracket: usize) -> Option<&str> {
        if !(1..=BRACKET_COUNT).contains(&bracket) {
            return None;
        }
        self.zones.get(&zone)?[bracket - 1].as_deref()
    }

    /// All zone keys present, sorted ascending.
    pub fn zone_keys(&self) -> Vec<i64> {
        let mut keys: Vec<i64> = self.zones.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn row_errors(&self) -> &[RowError] {
        &self.row_errors
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // Keep the first column when a header name repeats.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(name))
        .copied()
        .ok_or_else(|| AppError::new(EXIT_INPUT, format!("Missing required column: `{name}`")))
}

/// Parse a zone key such as `98115`, ` 98115 ` or `98115.0`.
pub fn parse_zone_key(s: &str) -> Option<i64> {
    parse_integer(s)
}

fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    // Spreadsheet exports sometimes write integer columns as floats.
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
