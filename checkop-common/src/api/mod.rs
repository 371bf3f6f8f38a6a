//! API module for backend request/response shapes
//!
//! Contains only serde types shared by the REST client and its consumers;
//! the HTTP calls themselves live in `checkop-client`.

pub mod types;

pub use types::{
    CheckType, CheckerFile, CheckerPage, PortabilityLookup, PortabilityRecord, Stats,
    Submitter, UploadResponse,
};
