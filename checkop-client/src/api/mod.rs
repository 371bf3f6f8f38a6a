//! Backend REST client
//!
//! Wraps the portability backend's documented surface: paginated file
//! listing, single-number lookup, multipart upload, deletion, and raw
//! export retrieval. Requests are not retried here — recovery is the
//! notification channel's job, and request/response failures propagate to
//! the caller as typed errors for transient user-facing messaging.

use checkop_common::api::types::{CheckerPage, CheckType, PortabilityLookup, UploadResponse};
use checkop_common::config::ClientConfig;
use checkop_common::{Error, Result};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::ingest::{PreparedUpload, RawArtifact};

/// Default page size for file listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub struct CheckerClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl CheckerClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            bearer_token: None,
        }
    }

    /// Attach a session token obtained from the authentication layer
    /// (opaque to this client).
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Paginated listing of uploaded files and their processing state.
    pub async fn list_files(
        &self,
        page: u32,
        page_size: u32,
        check_type: CheckType,
    ) -> Result<CheckerPage> {
        let url = format!(
            "{}/api/files/?page={}&page_size={}&check_type={}",
            self.base_url, page, page_size, check_type
        );
        let response = self.get(url).send().await?;
        Self::parse_json(response).await
    }

    /// Portability lookup for a single number.
    pub async fn check_number(&self, number: &str) -> Result<PortabilityLookup> {
        let url = format!("{}/api/check/portabilidade/{}", self.base_url, number);
        let response = self.get(url).send().await?;
        Self::parse_json(response).await
    }

    /// Submit a prepared (normalized) file for validation. The returned
    /// job id keys status events on the notification channel.
    pub async fn upload(
        &self,
        prepared: PreparedUpload,
        check_type: CheckType,
    ) -> Result<UploadResponse> {
        let part = Part::bytes(prepared.bytes)
            .file_name(prepared.file_name.clone())
            .mime_str("text/csv")
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("type", check_type.to_string());

        let mut request = self.http.post(format!("{}/api/files/", self.base_url));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.multipart(form).send().await?;
        let ack: UploadResponse = Self::parse_json(response).await?;
        info!(file = %prepared.file_name, rows = prepared.row_count, job_id = %ack.job_id(), "Upload accepted");
        Ok(ack)
    }

    /// Delete an uploaded file and its results, returning the backend's
    /// acknowledgment body.
    pub async fn delete_file(&self, id: &str) -> Result<serde_json::Value> {
        let mut request = self.http.delete(format!("{}/api/files/{}", self.base_url, id));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    /// Fetch a result export as raw bytes for the ingestion pipeline. The
    /// URL may point at the backend or at the external spreadsheet host;
    /// both route through the same pipeline afterwards.
    pub async fn fetch_export(&self, url: &str) -> Result<RawArtifact> {
        let response = self.get(url.to_string()).send().await?;
        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let name = export_file_name(url);
        let bytes = response.bytes().await?.to_vec();
        debug!(%url, size = bytes.len(), "Fetched export");

        Ok(RawArtifact {
            name,
            content_type,
            bytes,
        })
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }
        Ok(response.json::<T>().await?)
    }

    /// Map a non-success response to a typed error, preferring the
    /// backend's `{"error": "..."}` body when it has one.
    async fn backend_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| default_status_message(status));
        Error::Backend {
            status: status.as_u16(),
            message,
        }
    }
}

fn default_status_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

/// File name for a fetched export: last URL path segment, query stripped.
fn export_file_name(url: &str) -> String {
    url.rsplit('/')
        .next()
        .and_then(|segment| segment.split('?').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("export")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_name_comes_from_url_path() {
        assert_eq!(
            export_file_name("https://files.example.com/exports/result-42.xlsx?X-Amz-Expires=300"),
            "result-42.xlsx"
        );
        assert_eq!(export_file_name("https://files.example.com/"), "export");
    }

    #[test]
    fn status_fallback_message() {
        assert_eq!(default_status_message(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(
            default_status_message(StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }
}
