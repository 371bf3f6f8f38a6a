//! checkop-client - Check Operadora client core
//!
//! The two subsystems behind the portability dashboard:
//! - `notify`: persistent push channel for file-processing job status,
//!   with automatic reconnection and per-job fan-out.
//! - `ingest`: spreadsheet/delimited-text normalization into canonical
//!   phone records, used both before upload and on result exports.
//!
//! `api` wraps the backend REST surface the two subsystems cooperate with.

pub mod api;
pub mod ingest;
pub mod notify;

pub use checkop_common::{Error, Result};
