//! Batch fetch: one index query, concurrent enrichment of every hit.

use futures_util::future::join_all;
use std::sync::Arc;

use crate::feed::{BatchError, Enrichment, RecordEnricher};
use crate::models::{ExportFormat, PublicationRecord, RecentQuery};
use crate::sources::LiteratureIndex;

/// Fetches an author's most recent records and enriches them.
#[derive(Debug, Clone)]
pub struct BatchFetcher {
    index: Arc<dyn LiteratureIndex>,
    enricher: RecordEnricher,
    author: String,
}

impl BatchFetcher {
    /// Create a fetcher for the author identity `author` (an index search expression)
    pub fn new(index: Arc<dyn LiteratureIndex>, author: impl Into<String>) -> Self {
        Self::with_format(index, author, ExportFormat::default())
    }

    /// Create a fetcher requesting a specific export format
    pub fn with_format(
        index: Arc<dyn LiteratureIndex>,
        author: impl Into<String>,
        format: ExportFormat,
    ) -> Self {
        Self {
            enricher: RecordEnricher::new(index.clone(), format),
            index,
            author: author.into(),
        }
    }

    /// Fetch up to `max_items` records, newest first.
    ///
    /// Output order and length match the index's hit list. Records whose
    /// enrichment failed are kept without export text.
    pub async fn fetch_batch(&self, max_items: usize) -> Result<Vec<PublicationRecord>, BatchError> {
        let outcomes = self.fetch_batch_detailed(max_items).await?;
        Ok(outcomes.into_iter().map(Enrichment::into_record).collect())
    }

    /// Like [`fetch_batch`](Self::fetch_batch) but keeps each hit's enrichment outcome.
    pub async fn fetch_batch_detailed(&self, max_items: usize) -> Result<Vec<Enrichment>, BatchError> {
        let query = RecentQuery::new(self.author.as_str()).max_results(max_items);

        let hits = self.index.search_recent(&query).await.map_err(|e| {
            tracing::error!(index = self.index.id(), "Error fetching publications from {}: {}", self.index.name(), e);
            BatchError::from(e)
        })?;

        tracing::debug!(
            "{} returned {} hits, enriching with {}",
            self.index.name(),
            hits.len(),
            self.enricher.format()
        );

        // join_all polls every enrichment before any completes and waits for all of them.
        let outcomes = join_all(hits.into_iter().map(|hit| self.enricher.enrich(hit))).await;

        let degraded = outcomes.iter().filter(|o| o.is_degraded()).count();
        if degraded > 0 {
            tracing::warn!(
                "{} of {} records are missing {}",
                degraded,
                outcomes.len(),
                self.enricher.format()
            );
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::make_hit;
    use crate::sources::MockIndex;
    use std::time::Duration;

    fn hits(n: usize) -> Vec<crate::models::IndexHit> {
        (0..n)
            .map(|i| make_hit(&i.to_string(), &format!("Paper {}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_length() {
        let index = Arc::new(MockIndex::with_hits(hits(6)));
        index.fail_export("1", "boom");
        index.fail_export("4", "boom");
        let fetcher = BatchFetcher::new(index, "a Test.Author.1");

        let records = fetcher.fetch_batch(6).await.unwrap();
        assert_eq!(records.len(), 6);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.title(), format!("Paper {}", i));
        }
        let missing: Vec<_> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.export_text().is_none())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(missing, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_all_enrichments_failing_keeps_every_record() {
        let index = Arc::new(MockIndex::with_hits(hits(3)));
        for i in 0..3 {
            index.fail_export(i.to_string(), "down");
        }
        let fetcher = BatchFetcher::new(index, "a x");

        let outcomes = fetcher.fetch_batch_detailed(3).await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(Enrichment::is_degraded));
    }

    #[tokio::test]
    async fn test_search_failure_skips_enrichment() {
        let index = Arc::new(MockIndex::with_hits(hits(3)));
        index.fail_search(500);
        let fetcher = BatchFetcher::new(index.clone(), "a x");

        let result = fetcher.fetch_batch(3).await;
        assert!(matches!(result, Err(BatchError::Query(_))));
        assert_eq!(index.export_calls(), 0);
    }

    #[tokio::test]
    async fn test_enrichments_run_concurrently() {
        let index = Arc::new(MockIndex::with_hits(hits(5)));
        index.set_export_delay(Duration::from_millis(20));
        let fetcher = BatchFetcher::new(index.clone(), "a x");

        let records = fetcher.fetch_batch(5).await.unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(index.export_calls(), 5);
        assert_eq!(index.peak_in_flight(), 5);
    }

    #[tokio::test]
    async fn test_empty_hit_list() {
        let index = Arc::new(MockIndex::new());
        let fetcher = BatchFetcher::new(index, "a x");
        assert!(fetcher.fetch_batch(6).await.unwrap().is_empty());
    }
}
