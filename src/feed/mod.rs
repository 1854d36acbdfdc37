//! Batch fetching and per-record enrichment.
//!
//! [`BatchFetcher`] issues one query to a [`LiteratureIndex`](crate::sources::LiteratureIndex),
//! then enriches every hit concurrently through [`RecordEnricher`]. Enrichment
//! failures stay local to their record; only a failed index query is a
//! [`BatchError`].

mod enricher;
mod fetcher;

pub use enricher::{primary_link, Enrichment, RecordEnricher};
pub use fetcher::BatchFetcher;

use crate::sources::SourceError;
use crate::state::DisplayState;

/// Message shown to users when the batch could not be loaded
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load publications. Please try again later.";

/// Fatal failure of one batch fetch
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The index query failed, returned a non-success status or an unreadable body
    #[error("Index query failed: {0}")]
    Query(#[from] SourceError),
}

impl BatchError {
    /// Message suitable for display
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILURE_MESSAGE
    }
}

/// Run one pipeline activation: start loading, fetch, settle the state.
///
/// The returned state is either `Ready` with the fetched records or `Failed`
/// with the user-facing error message.
pub async fn activate(fetcher: &BatchFetcher, state: DisplayState, max_items: usize) -> DisplayState {
    let state = state.start_fetch();
    match fetcher.fetch_batch(max_items).await {
        Ok(records) => state.fetch_succeeded(records),
        Err(e) => state.fetch_failed(e.user_message()),
    }
}
