//! Pre-upload validation and normalization
//!
//! Before transmission, an uploaded sheet is checked (extension, MIME when
//! present, size cap) and re-encoded into the minimal delimited form the
//! backend ingests: a single lower-case `numero` header followed by one
//! subscriber number per line. Everything else in the source file stays on
//! the client.

use checkop_common::{Error, Result};
use tracing::debug;

use super::columns::{cell_value, find_column, NUMBER_ALIASES};
use super::decode;
use super::RawArtifact;

/// Upload size cap: 10 MB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".csv", ".txt"];
const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
    "text/plain",
];

/// A normalized upload body ready for multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    /// File name sent to the backend (source stem, `.csv` extension).
    pub file_name: String,
    /// Minimal delimited body: `numero` header plus one number per row.
    pub bytes: Vec<u8>,
    /// Numbers included.
    pub row_count: usize,
}

/// Validate and normalize an artifact for upload.
///
/// Unlike [`super::ingest`], this path is allowed to reject: a file the user
/// picked by mistake should fail before any bytes leave the machine.
pub fn prepare_upload(artifact: &RawArtifact) -> Result<PreparedUpload> {
    validate(artifact)?;

    let grid = decode::decode_grid(artifact)
        .map_err(|e| Error::UploadRejected(format!("could not read file: {e}")))?;
    if grid.len() < 2 {
        return Err(Error::UploadRejected("file has no data rows".to_string()));
    }

    let headers: Vec<String> = grid[0].iter().map(|h| h.to_lowercase().trim().to_string()).collect();
    let number_column = find_column(&headers, NUMBER_ALIASES).ok_or_else(|| {
        Error::UploadRejected("no subscriber-number column found in header".to_string())
    })?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    writer
        .write_record(["numero"])
        .map_err(|e| Error::UploadRejected(e.to_string()))?;

    let mut row_count = 0usize;
    for row in grid.iter().skip(1) {
        let Some(number) = cell_value(row, Some(number_column)) else {
            continue;
        };
        writer
            .write_record([number.as_str()])
            .map_err(|e| Error::UploadRejected(e.to_string()))?;
        row_count += 1;
    }

    if row_count == 0 {
        return Err(Error::UploadRejected(
            "no subscriber numbers found in file".to_string(),
        ));
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::UploadRejected(e.to_string()))?;

    let stem = artifact
        .name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(&artifact.name);
    debug!(file = %artifact.name, rows = row_count, "Prepared upload body");

    Ok(PreparedUpload {
        file_name: format!("{stem}.csv"),
        bytes,
        row_count,
    })
}

fn validate(artifact: &RawArtifact) -> Result<()> {
    let name = artifact.name.to_lowercase();
    if !ALLOWED_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        return Err(Error::UploadRejected(
            "unsupported file type, use .xlsx, .xls, .csv or .txt".to_string(),
        ));
    }

    // Browsers leave the MIME type empty often enough that absence is fine
    if let Some(mime) = artifact.content_type.as_deref() {
        if !mime.is_empty() && !ALLOWED_MIME_TYPES.contains(&mime) {
            return Err(Error::UploadRejected(format!("invalid file format: {mime}")));
        }
    }

    if artifact.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(Error::UploadRejected(format!(
            "file too large, maximum is {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}
