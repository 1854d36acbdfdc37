//! Per-record enrichment with citation-export text.

use std::sync::Arc;

use crate::models::{ExportFormat, IndexHit, PublicationRecord, PublicationRecordBuilder};
use crate::sources::LiteratureIndex;

/// Settled outcome of enriching one hit.
///
/// Enrichment never fails outward: a failed export lookup yields a degraded
/// record that keeps every base field and has no export text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    /// Export text was fetched
    Enriched(PublicationRecord),
    /// Export lookup failed; the record is still displayable
    Degraded {
        record: PublicationRecord,
        reason: String,
    },
}

impl Enrichment {
    /// The record, enriched or not
    pub fn record(&self) -> &PublicationRecord {
        match self {
            Enrichment::Enriched(record) => record,
            Enrichment::Degraded { record, .. } => record,
        }
    }

    /// Consume the outcome, keeping the record
    pub fn into_record(self) -> PublicationRecord {
        match self {
            Enrichment::Enriched(record) => record,
            Enrichment::Degraded { record, .. } => record,
        }
    }

    /// Whether the export lookup failed
    pub fn is_degraded(&self) -> bool {
        matches!(self, Enrichment::Degraded { .. })
    }
}

/// Fetches export text for individual hits
#[derive(Debug, Clone)]
pub struct RecordEnricher {
    index: Arc<dyn LiteratureIndex>,
    format: ExportFormat,
}

impl RecordEnricher {
    /// Create an enricher requesting `format` from `index`
    pub fn new(index: Arc<dyn LiteratureIndex>, format: ExportFormat) -> Self {
        Self { index, format }
    }

    /// Export format requested for each record
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Enrich one hit.
    pub async fn enrich(&self, hit: IndexHit) -> Enrichment {
        let IndexHit {
            id,
            title,
            authors,
            r#abstract,
            external_id,
        } = hit;

        let external_id = external_id.filter(|e| !e.trim().is_empty());
        let link = primary_link(self.index.as_ref(), &id, external_id.as_deref());
        let base = PublicationRecordBuilder::new(id.clone(), title, link)
            .authors(authors)
            .abstract_text(r#abstract)
            .external_id(external_id);

        match self.index.fetch_export(&id, self.format).await {
            Ok(text) => Enrichment::Enriched(base.export_text(text).build()),
            Err(e) => {
                tracing::warn!("Error fetching {} for {}: {}", self.format, id, e);
                Enrichment::Degraded {
                    record: base.build(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Preprint URL when an external identifier exists, else the index permalink
pub fn primary_link(index: &dyn LiteratureIndex, id: &str, external_id: Option<&str>) -> String {
    match external_id {
        Some(external) => index.preprint_url(external),
        None => index.record_url(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockIndex;

    fn hit() -> IndexHit {
        IndexHit::new("17", "On $\\mathbb{P}^2$")
            .authors(["Hirst, Edward Charles", "He, Yang-Hui"])
            .abstract_text("Abstract $x$")
            .external_id("2301.00017")
    }

    #[tokio::test]
    async fn test_enrich_success() {
        let index = Arc::new(MockIndex::new());
        let enricher = RecordEnricher::new(index, ExportFormat::Bibtex);

        let outcome = enricher.enrich(hit()).await;
        assert!(!outcome.is_degraded());

        let record = outcome.into_record();
        assert_eq!(record.title(), "On $\\mathbb{P}^2$");
        assert_eq!(record.primary_link(), "https://arxiv.org/pdf/2301.00017");
        assert!(record.export_text().unwrap().starts_with("@article{mock:17"));
    }

    #[tokio::test]
    async fn test_enrich_failure_degrades() {
        let index = Arc::new(MockIndex::new());
        index.fail_export("17", "connection reset");
        let enricher = RecordEnricher::new(index, ExportFormat::Bibtex);

        let outcome = enricher.enrich(hit()).await;
        match &outcome {
            Enrichment::Degraded { reason, .. } => assert!(reason.contains("connection reset")),
            other => panic!("expected degraded outcome, got {:?}", other),
        }

        let record = outcome.record();
        assert!(record.export_text().is_none());
        assert_eq!(record.authors().len(), 2);
        assert_eq!(record.abstract_text(), Some("Abstract $x$"));
        assert_eq!(record.external_id(), Some("2301.00017"));
        assert_eq!(record.primary_link(), "https://arxiv.org/pdf/2301.00017");
    }

    #[test]
    fn test_primary_link_falls_back_to_permalink() {
        let index = MockIndex::new();
        assert_eq!(
            primary_link(&index, "99", None),
            "https://index.example/literature/99"
        );
        assert_eq!(
            primary_link(&index, "99", Some("2401.00001")),
            "https://arxiv.org/pdf/2401.00001"
        );
    }

    #[tokio::test]
    async fn test_blank_external_id_uses_permalink() {
        let index = Arc::new(MockIndex::new());
        let enricher = RecordEnricher::new(index, ExportFormat::Bibtex);
        let record = enricher
            .enrich(IndexHit::new("5", "T").external_id("  "))
            .await
            .into_record();
        assert_eq!(record.primary_link(), "https://index.example/literature/5");
        assert!(record.external_id().is_none());
    }
}
