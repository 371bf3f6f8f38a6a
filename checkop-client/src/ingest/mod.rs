//! Sheet ingestion pipeline
//!
//! Converts an uploaded or backend-exported tabular artifact into canonical
//! phone records: decode to a string grid, resolve columns by header
//! aliases, project each row. Tolerant by contract — malformed input yields
//! an empty (or partial) record list plus a diagnostic, never an error or a
//! panic. Used both before upload (minimal re-encode) and after download
//! (result display).

mod columns;
mod decode;
mod record;
mod upload;

pub use columns::ColumnMap;
pub use record::{PhoneRecord, PhoneRecordRow, SENTINEL};
pub use upload::{prepare_upload, PreparedUpload, MAX_UPLOAD_BYTES};

use columns::cell_value;
use tracing::{debug, warn};

/// A file as handed to the pipeline: user upload or fetched export.
#[derive(Debug, Clone)]
pub struct RawArtifact {
    /// Original file name (extension participates in container detection).
    pub name: String,
    /// MIME type as reported by the browser or server. Untrustworthy.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What happened during an ingestion, alongside the records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestDiagnostic {
    /// Records emitted.
    pub row_count: usize,
    /// Data rows scanned before filtering (header excluded). Lets callers
    /// distinguish "file empty" from "no usable subscriber numbers".
    pub rows_scanned: usize,
    /// Present when the result is degraded (decode failure, no data).
    pub warning: Option<String>,
}

/// Best-effort ingestion result.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub records: Vec<PhoneRecord>,
    pub diagnostic: IngestDiagnostic,
}

impl IngestOutcome {
    fn empty(rows_scanned: usize, warning: impl Into<String>) -> Self {
        IngestOutcome {
            records: Vec::new(),
            diagnostic: IngestDiagnostic {
                row_count: 0,
                rows_scanned,
                warning: Some(warning.into()),
            },
        }
    }

    /// Sentinel-defaulted rows for display.
    pub fn rows(&self) -> Vec<PhoneRecordRow> {
        self.records.iter().map(PhoneRecord::to_row).collect()
    }
}

/// Ingest an artifact into canonical records. Never fails: decode problems
/// and empty inputs are reported through the diagnostic.
pub fn ingest(artifact: &RawArtifact) -> IngestOutcome {
    let grid = match decode::decode_grid(artifact) {
        Ok(grid) => grid,
        Err(e) => {
            warn!(file = %artifact.name, error = %e, "Ingestion decode failed");
            return IngestOutcome::empty(0, format!("could not read file: {e}"));
        }
    };

    if grid.len() < 2 {
        return IngestOutcome::empty(0, "file has no data rows");
    }

    let map = ColumnMap::resolve(&grid[0]);
    debug!(file = %artifact.name, ?map, "Resolved ingestion columns");

    let mut records = Vec::new();
    let mut rows_scanned = 0usize;

    for (index, row) in grid.iter().enumerate().skip(1) {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows_scanned += 1;

        // Subscriber number is the only mandatory field
        let Some(number) = cell_value(row, map.number) else {
            continue;
        };

        let explicit_ddd = cell_value(row, map.ddd);
        records.push(PhoneRecord {
            id: index,
            ddd: record::derive_ddd(&number, explicit_ddd.as_deref()),
            anatel: cell_value(row, map.anatel),
            line_type: cell_value(row, map.line_type),
            origin_carrier: cell_value(row, map.origin_carrier),
            current_carrier: cell_value(row, map.current_carrier),
            ported: record::parse_ported(cell_value(row, map.ported).as_deref()),
            port_date: cell_value(row, map.port_date).map(|d| record::normalize_port_date(&d)),
            municipality: cell_value(row, map.municipality),
            municipality_region: cell_value(row, map.municipality_region),
            uf: cell_value(row, map.uf),
            number,
        });
    }

    let warning = if records.is_empty() {
        Some("file has no data rows".to_string())
    } else {
        None
    };

    IngestOutcome {
        diagnostic: IngestDiagnostic {
            row_count: records.len(),
            rows_scanned,
            warning,
        },
        records,
    }
}
