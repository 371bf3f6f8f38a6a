//! Job-status event types for the notification channel
//!
//! The backend pushes processing-status updates for uploaded files over a
//! persistent WebSocket. Every payload is a JSON envelope carrying a `type`
//! tag; only `file_status` envelopes belong to this protocol. Envelopes with
//! an unrecognized tag are ignored (forward compatibility with protocol
//! evolution), while payloads that fail to parse at all are reported to the
//! caller so the drop can be logged.

use serde::{Deserialize, Serialize};

/// Processing status of an uploaded file, as reported by the backend.
///
/// There is no explicit "queued" status on the wire: a job for which no
/// event has arrived yet is simply unknown/indeterminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Backend is validating the file; `progress` may update repeatedly.
    Processing,
    /// Terminal: validation finished and the export is available.
    Completed,
    /// Terminal: validation failed; `error` carries the reason.
    Failed,
}

impl FileStatus {
    /// Whether this status ends the job's state machine.
    ///
    /// Events arriving after a terminal status (duplicates across a
    /// reconnect boundary) must be treated idempotently by consumers.
    pub fn is_terminal(self) -> bool {
        matches!(self, FileStatus::Completed | FileStatus::Failed)
    }
}

/// One status update for a backend file-processing job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatusEvent {
    /// Backend-assigned identifier correlating the upload to its job.
    pub file_id: String,
    /// Current processing status.
    pub status: FileStatus,
    /// Progress percentage, meaningful only while `Processing`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Human-readable failure reason, present only when `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Wire envelope for channel payloads.
///
/// ```json
/// { "type": "file_status", "data": { "file_id": "...", "status": "processing" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

/// Tag identifying job-status envelopes.
pub const FILE_STATUS_TYPE: &str = "file_status";

/// Parse a raw channel payload.
///
/// Returns:
/// - `Ok(Some(event))` for a well-formed `file_status` envelope
/// - `Ok(None)` for a well-formed envelope of another type (ignored)
/// - `Err(_)` for a payload that does not match the envelope schema
pub fn parse_channel_payload(raw: &str) -> serde_json::Result<Option<FileStatusEvent>> {
    let envelope: Envelope = serde_json::from_str(raw)?;

    if envelope.kind != FILE_STATUS_TYPE {
        tracing::debug!(kind = %envelope.kind, "Ignoring channel payload of foreign type");
        return Ok(None);
    }

    let event: FileStatusEvent = serde_json::from_value(envelope.data)?;
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_processing_event() {
        let raw = r#"{"type":"file_status","data":{"file_id":"abc","status":"processing","progress":42}}"#;
        let event = parse_channel_payload(raw).unwrap().unwrap();
        assert_eq!(event.file_id, "abc");
        assert_eq!(event.status, FileStatus::Processing);
        assert_eq!(event.progress, Some(42));
        assert_eq!(event.error, None);
    }

    #[test]
    fn parses_failed_event_with_error() {
        let raw = r#"{"type":"file_status","data":{"file_id":"abc","status":"failed","error":"quota exceeded"}}"#;
        let event = parse_channel_payload(raw).unwrap().unwrap();
        assert_eq!(event.status, FileStatus::Failed);
        assert_eq!(event.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn foreign_type_is_ignored_not_an_error() {
        let raw = r#"{"type":"credit_update","data":{"balance":10}}"#;
        assert!(parse_channel_payload(raw).unwrap().is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_channel_payload("not json at all").is_err());
        // Envelope shape but data missing mandatory fields
        let raw = r#"{"type":"file_status","data":{"status":"processing"}}"#;
        assert!(parse_channel_payload(raw).is_err());
        // Unknown status string
        let raw = r#"{"type":"file_status","data":{"file_id":"x","status":"exploded"}}"#;
        assert!(parse_channel_payload(raw).is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!FileStatus::Processing.is_terminal());
        assert!(FileStatus::Completed.is_terminal());
        assert!(FileStatus::Failed.is_terminal());
    }
}
