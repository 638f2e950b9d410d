// Reads Search Console query exports
//
// The header row decides where each field lives. A missing required column
// stops everything; a half-empty numeric cell is just zero.

use crate::config::ColumnMapping;
use crate::data::QueryRecord;
use crate::error::{QueryIntentError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::debug;

// Column positions resolved from the header
struct ColumnIndex {
    query: usize,
    clicks: usize,
    impressions: usize,
    ctr: usize,
    position: usize,
}

pub struct QueryReader {
    columns: ColumnMapping,
}

impl QueryReader {
    pub fn new(columns: ColumnMapping) -> Self {
        Self { columns }
    }

    /// Read every query row from a CSV file
    pub fn read_path(&self, path: &Path) -> Result<Vec<QueryRecord>> {
        let file = std::fs::File::open(path)?;
        self.read_from(file)
    }

    /// Read every query row from any CSV source
    ///
    /// # Returns
    /// * `Ok(Vec<QueryRecord>)` - one record per data row, in file order
    /// * `Err(MissingColumn)` - a required header is absent
    /// * `Err(EmptyInput)` - header only, no rows
    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<QueryRecord>> {
        let mut reader = ReaderBuilder::new().trim(Trim::Headers).from_reader(source);

        let headers = reader.headers()?.clone();
        let index = self.resolve_columns(&headers)?;

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row?;
            // header is line 1
            let line = row.position().map(|p| p.line() as usize).unwrap_or(i + 2);
            records.push(Self::parse_row(&row, &index, line)?);
        }

        if records.is_empty() {
            return Err(QueryIntentError::EmptyInput);
        }

        debug!(rows = records.len(), "read query export");
        Ok(records)
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<ColumnIndex> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
                .ok_or_else(|| QueryIntentError::MissingColumn(name.to_string()))
        };

        Ok(ColumnIndex {
            query: find(&self.columns.query)?,
            clicks: find(&self.columns.clicks)?,
            impressions: find(&self.columns.impressions)?,
            ctr: find(&self.columns.ctr)?,
            position: find(&self.columns.position)?,
        })
    }

    fn parse_row(row: &StringRecord, index: &ColumnIndex, line: usize) -> Result<QueryRecord> {
        let cell = |i: usize| row.get(i).unwrap_or("");

        Ok(QueryRecord {
            // query text is kept byte for byte
            query: cell(index.query).to_string(),
            clicks: parse_count(cell(index.clicks), "clicks", line)?,
            impressions: parse_count(cell(index.impressions), "impressions", line)?,
            ctr: parse_decimal(cell(index.ctr).trim().trim_end_matches('%'), "CTR", line)?,
            position: parse_decimal(cell(index.position), "position", line)?,
        })
    }
}

impl Default for QueryReader {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

// Whole numbers, tolerating thousands separators
fn parse_count(raw: &str, field: &str, line: usize) -> Result<u64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return Ok(0);
    }

    cleaned.parse::<u64>().map_err(|_| QueryIntentError::InvalidRecord {
        row: line,
        reason: format!("{} '{}' is not a whole number", field, raw),
    })
}

fn parse_decimal(raw: &str, field: &str, line: usize) -> Result<f64> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Ok(0.0);
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| QueryIntentError::InvalidRecord {
            row: line,
            reason: format!("{} '{}' is not a number", field, raw),
        })
}
