//! Canonical phone records and field normalization
//!
//! The parser works with proper optional semantics internally; the `-`
//! sentinel the dashboard expects is applied only when projecting a record
//! into its presentation row, so normalization logic and tests stay free of
//! magic strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Placeholder for any field that could not be resolved or was empty.
pub const SENTINEL: &str = "-";

/// Truthy spellings of the ported flag, matched case-insensitively.
const PORTED_TRUTHY: &[&str] = &["sim", "true", "1", "yes"];

/// Display format for port dates (pt-BR, two-digit year, no seconds).
const PORT_DATE_FORMAT: &str = "%d/%m/%y %H:%M";

/// One normalized phone-number row. The subscriber number is the only
/// mandatory field; rows without one never become records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneRecord {
    /// Per-ingestion sequence id (row index). Not stable across ingestions.
    pub id: usize,
    /// Area code, explicit or derived from the number.
    pub ddd: Option<String>,
    /// Subscriber number as it appeared in the source.
    pub number: String,
    /// Regulatory validity label.
    pub anatel: Option<String>,
    /// Line type (fixed/mobile).
    pub line_type: Option<String>,
    pub origin_carrier: Option<String>,
    pub current_carrier: Option<String>,
    /// Whether the number was ported between carriers.
    pub ported: bool,
    /// Port date, reformatted when parseable, verbatim otherwise.
    pub port_date: Option<String>,
    pub municipality: Option<String>,
    /// Region alias; falls back to the municipality at presentation.
    pub municipality_region: Option<String>,
    /// Two-letter state code.
    pub uf: Option<String>,
}

/// Presentation projection: every field a non-empty string (or bool), the
/// sentinel substituted for anything absent. Downstream rendering never
/// null-checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneRecordRow {
    pub id: String,
    pub ddd: String,
    pub number: String,
    pub anatel: String,
    #[serde(rename = "type")]
    pub line_type: String,
    pub origin_carrier: String,
    pub current_carrier: String,
    pub ported: bool,
    pub port_date: String,
    pub municipality: String,
    pub municipality_region: String,
    pub uf: String,
}

impl PhoneRecord {
    /// Apply the sentinel defaults and produce the row the UI consumes.
    pub fn to_row(&self) -> PhoneRecordRow {
        let or_sentinel =
            |value: &Option<String>| value.clone().unwrap_or_else(|| SENTINEL.to_string());
        PhoneRecordRow {
            id: self.id.to_string(),
            ddd: or_sentinel(&self.ddd),
            number: self.number.clone(),
            anatel: or_sentinel(&self.anatel),
            line_type: or_sentinel(&self.line_type),
            origin_carrier: or_sentinel(&self.origin_carrier),
            current_carrier: or_sentinel(&self.current_carrier),
            ported: self.ported,
            port_date: or_sentinel(&self.port_date),
            municipality: or_sentinel(&self.municipality),
            // Region alias falls back to the plain municipality
            municipality_region: self
                .municipality_region
                .clone()
                .or_else(|| self.municipality.clone())
                .unwrap_or_else(|| SENTINEL.to_string()),
            uf: or_sentinel(&self.uf),
        }
    }
}

/// Parse the ported flag: a fixed truthy set, everything else (including
/// absence) is false.
pub fn parse_ported(value: Option<&str>) -> bool {
    match value {
        Some(v) => {
            let normalized = v.trim().to_lowercase();
            PORTED_TRUTHY.contains(&normalized.as_str())
        }
        None => false,
    }
}

/// Reformat a port date to `dd/mm/yy HH:MM`. Values that do not parse as a
/// date pass through unchanged; that is the documented fallback, not an
/// error.
pub fn normalize_port_date(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == SENTINEL {
        return trimmed.to_string();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.format(PORT_DATE_FORMAT).to_string();
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return parsed.format(PORT_DATE_FORMAT).to_string();
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(midnight) = parsed.and_hms_opt(0, 0, 0) {
                return midnight.format(PORT_DATE_FORMAT).to_string();
            }
        }
    }

    trimmed.to_string()
}

/// Area code: the explicit column value when present, otherwise the first
/// two digits of a digits-only number of at least 10 digits.
pub fn derive_ddd(number: &str, explicit: Option<&str>) -> Option<String> {
    if let Some(value) = explicit {
        let value = value.trim();
        if !value.is_empty() && value != SENTINEL {
            return Some(value.to_string());
        }
    }

    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 10 {
        Some(digits[..2].to_string())
    } else {
        None
    }
}
