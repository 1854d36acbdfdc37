//! Literature index clients.
//!
//! This module defines the [`LiteratureIndex`] trait that the batch fetcher runs
//! against. An index answers two kinds of request:
//!
//! - a single query for an author's most recent records ([`LiteratureIndex::search_recent`])
//! - one citation-export lookup per record ([`LiteratureIndex::fetch_export`])
//!
//! [`InspireSource`] talks to the INSPIRE-HEP REST API. [`MockIndex`] serves
//! canned hits and exports from memory for tests.

mod inspire;
pub mod mock;

pub use inspire::{InspireSource, INSPIRE_API_BASE, INSPIRE_SITE_BASE};
pub use mock::MockIndex;

use crate::models::{ExportFormat, IndexHit, RecentQuery};
use async_trait::async_trait;

/// Base URL for preprint PDFs keyed by arXiv number
pub const ARXIV_PDF_BASE: &str = "https://arxiv.org/pdf";

/// A literature index that can list recent records and export citations.
#[async_trait]
pub trait LiteratureIndex: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this index (e.g., "inspire")
    fn id(&self) -> &str;

    /// Human-readable name of this index
    fn name(&self) -> &str;

    /// Fetch the most recent records for the query's author, newest first.
    ///
    /// Hits are returned in the order the index produced them.
    async fn search_recent(&self, query: &RecentQuery) -> Result<Vec<IndexHit>, SourceError>;

    /// Fetch the citation-export text for one record
    async fn fetch_export(&self, id: &str, format: ExportFormat) -> Result<String, SourceError>;

    /// The index's own permalink for a record
    fn record_url(&self, id: &str) -> String;

    /// Canonical preprint URL for an external identifier
    fn preprint_url(&self, external_id: &str) -> String {
        format!("{}/{}", ARXIV_PDF_BASE, external_id)
    }
}

/// Errors that can occur when talking to a literature index
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The index answered with a non-success status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Parsing error (JSON, text decoding)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The body decoded but is not the expected payload
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Invalid request parameters or configuration
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SourceError::Status(status.as_u16()),
            None => SourceError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = SourceError::Status(503);
        assert_eq!(err.to_string(), "HTTP error! status: 503");
    }

    #[test]
    fn test_json_error_conversion() {
        let err: SourceError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn test_default_preprint_url() {
        let index = MockIndex::new();
        assert_eq!(
            index.preprint_url("2301.12345"),
            "https://arxiv.org/pdf/2301.12345"
        );
    }
}
