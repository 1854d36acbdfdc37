//! Mock index for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::models::{ExportFormat, IndexHit, RecentQuery};
use crate::sources::{LiteratureIndex, SourceError};

/// An in-memory index that returns predefined hits and exports.
///
/// Exports default to a small BibTeX entry per hit. Individual ids can be made
/// to fail, and every export call can be delayed to exercise concurrency.
#[derive(Debug, Default)]
pub struct MockIndex {
    hits: Mutex<Vec<IndexHit>>,
    search_failure: Mutex<Option<u16>>,
    export_failures: Mutex<HashMap<String, String>>,
    export_delay: Mutex<Option<Duration>>,
    export_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockIndex {
    /// Create a new empty mock index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock index serving the given hits.
    pub fn with_hits(hits: Vec<IndexHit>) -> Self {
        let index = Self::new();
        index.set_hits(hits);
        index
    }

    /// Set the hits returned by `search_recent`.
    pub fn set_hits(&self, hits: Vec<IndexHit>) {
        *lock(&self.hits) = hits;
    }

    /// Make `search_recent` answer with the given HTTP status.
    pub fn fail_search(&self, status: u16) {
        *lock(&self.search_failure) = Some(status);
    }

    /// Make the export lookup for `id` fail with the given message.
    pub fn fail_export(&self, id: impl Into<String>, message: impl Into<String>) {
        lock(&self.export_failures).insert(id.into(), message.into());
    }

    /// Delay every export lookup by `delay`.
    pub fn set_export_delay(&self, delay: Duration) {
        *lock(&self.export_delay) = Some(delay);
    }

    /// Number of export lookups performed so far.
    pub fn export_calls(&self) -> usize {
        self.export_calls.load(Ordering::SeqCst)
    }

    /// Largest number of export lookups observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiteratureIndex for MockIndex {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Index"
    }

    async fn search_recent(&self, query: &RecentQuery) -> Result<Vec<IndexHit>, SourceError> {
        if let Some(status) = *lock(&self.search_failure) {
            return Err(SourceError::Status(status));
        }
        let hits = lock(&self.hits);
        Ok(hits.iter().take(query.max_results).cloned().collect())
    }

    async fn fetch_export(&self, id: &str, format: ExportFormat) -> Result<String, SourceError> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *lock(&self.export_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = lock(&self.export_failures).get(id) {
            return Err(SourceError::Network(message.clone()));
        }

        Ok(match format {
            ExportFormat::Bibtex => format!("@article{{mock:{},\n    title = \"mock\"\n}}\n", id),
            ExportFormat::LatexEu | ExportFormat::LatexUs => format!("%\\cite{{mock:{}}}\n", id),
        })
    }

    fn record_url(&self, id: &str) -> String {
        format!("https://index.example/literature/{}", id)
    }
}

/// Helper function to create a mock hit for testing.
pub fn make_hit(id: &str, title: &str) -> IndexHit {
    IndexHit::new(id, title).authors([format!("Author{}, Test", id)])
}
