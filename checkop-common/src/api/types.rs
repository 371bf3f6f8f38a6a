//! Backend API request/response types
//!
//! Mirrors the documented REST shapes of the portability-checking backend.
//! Timestamps are kept as raw strings: the backend's format is not part of
//! the contract and the UI renders them verbatim.

use crate::events::FileStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Validation category for an uploaded file.
///
/// Only portability checks exist today; the tag is still sent explicitly on
/// upload so new categories can be added without a wire change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    #[default]
    Portabilidade,
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckType::Portabilidade => write!(f, "portabilidade"),
        }
    }
}

/// Aggregate statistics the backend computes for a processed file.
///
/// Every field is optional: files still processing (or failed) carry a null
/// or empty stats blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Row count per area code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddd: Option<HashMap<String, u64>>,
    /// Fixed-line count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixo: Option<u64>,
    /// Mobile-line count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movel: Option<u64>,
    /// Distinct state count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uf: Option<u64>,
    /// Distinct municipality count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<u64>,
    /// Rows that failed regulatory validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid: Option<u64>,
    /// Rows that passed regulatory validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<u64>,
    /// Row count per current carrier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operadora: Option<HashMap<String, u64>>,
    /// Rows whose number was ported between carriers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portado: Option<u64>,
    /// Total row count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Who uploaded a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitter {
    pub id: String,
    pub name: String,
}

/// One processed (or processing) file as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerFile {
    pub id: String,
    /// Null while processing; possibly an empty object on older jobs.
    #[serde(default)]
    pub stats: Option<Stats>,
    pub submitter: Submitter,
    pub check_type: CheckType,
    pub original_file_name: String,
    /// Direct URL of the result export (binary spreadsheet host).
    pub s3_url: String,
    pub status: FileStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Paginated file listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckerPage {
    pub data: Vec<CheckerFile>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

/// Acknowledgment for a file upload.
///
/// `file_id` (when present) is the key under which status events for this
/// job arrive on the notification channel; older backends only return `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl UploadResponse {
    /// Identifier to subscribe with on the notification channel.
    pub fn job_id(&self) -> &str {
        self.file_id.as_deref().unwrap_or(&self.id)
    }
}

/// Portability data for a single number lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortabilityRecord {
    pub numero: String,
    pub operadora_original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operadora_atual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_portabilidade: Option<String>,
    pub tipo: String,
}

/// Response for a single-number portability query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortabilityLookup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PortabilityRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
