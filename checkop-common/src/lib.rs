//! # Check Operadora Common Library
//!
//! Shared code for the Check Operadora client crates including:
//! - Job-status event types and wire envelope parsing
//! - Backend API request/response types
//! - Statistics helpers
//! - Configuration loading
//! - Error types

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod stats;

pub use error::{Error, Result};
