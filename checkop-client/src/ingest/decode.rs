//! Raw artifact decoding into a string grid
//!
//! Turns an uploaded or downloaded artifact into header-plus-rows string
//! cells, without interpreting any of them. Container detection goes by
//! magic bytes first (MIME types on uploads are routinely empty or wrong),
//! falling back to the file extension; anything that is not a recognizable
//! binary spreadsheet is treated as delimited text.

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

use super::RawArtifact;

/// ZIP local-file magic: xlsx/xlsm containers.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// OLE compound-file magic: legacy xls.
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported or corrupt spreadsheet container: {0}")]
    Container(String),
    #[error("spreadsheet has no readable sheet")]
    NoSheet,
    #[error("delimited text could not be read: {0}")]
    Text(String),
}

/// Decode an artifact into rows of trimmed string cells. The first row is
/// the (unvalidated) header.
pub fn decode_grid(artifact: &RawArtifact) -> Result<Vec<Vec<String>>, DecodeError> {
    if looks_like_spreadsheet(artifact) {
        decode_spreadsheet(&artifact.bytes)
    } else {
        decode_delimited(&artifact.bytes)
    }
}

fn looks_like_spreadsheet(artifact: &RawArtifact) -> bool {
    if artifact.bytes.starts_with(&ZIP_MAGIC) || artifact.bytes.starts_with(&OLE_MAGIC) {
        return true;
    }
    // Extension fallback for truncated/unusual containers
    let name = artifact.name.to_lowercase();
    name.ends_with(".xlsx") || name.ends_with(".xls") || name.ends_with(".xlsm")
}

fn decode_spreadsheet(bytes: &[u8]) -> Result<Vec<Vec<String>>, DecodeError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| DecodeError::Container(e.to_string()))?;

    // First sheet only, matching the dashboard's display behavior
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoSheet)?
        .map_err(|e| DecodeError::Container(e.to_string()))?;

    debug!(rows = range.height(), cols = range.width(), "Decoded spreadsheet range");

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// Render one spreadsheet cell the way the dashboard expects: integers
/// without a trailing `.0` (phone numbers arrive as floats), dates in a
/// form the port-date normalizer can parse.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::Error(e) => {
            debug!(error = ?e, "Spreadsheet cell carries an error value");
            String::new()
        }
    }
}

fn decode_delimited(bytes: &[u8]) -> Result<Vec<Vec<String>>, DecodeError> {
    let text = String::from_utf8_lossy(bytes);
    let delimiter = sniff_delimiter(&text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DecodeError::Text(e.to_string()))?;
        rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    Ok(rows)
}

/// Pick the delimiter by counting candidates in the first non-empty line.
/// Exports use `;`; user uploads are commonly `,` or tab-separated.
pub(crate) fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    // First candidate wins a tie, keeping the export default
    let mut best = (b';', 0usize);
    for candidate in [b';', b',', b'\t'] {
        let count = header.bytes().filter(|&b| b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}
