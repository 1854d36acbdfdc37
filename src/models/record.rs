//! Publication record produced by one batch fetch.

use serde::{Deserialize, Serialize};

/// A publication ready for display
///
/// Records are immutable once built. A record whose enrichment failed is still
/// valid for display; it simply has no export text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    id: String,
    title: String,
    authors: Vec<String>,
    r#abstract: Option<String>,
    primary_link: String,
    external_id: Option<String>,
    export_text: Option<String>,
}

impl PublicationRecord {
    /// Index identifier this record was built from
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw title, may contain inline math markup
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw `"Last, First Middle"` author names
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Raw abstract, if the index has one
    pub fn abstract_text(&self) -> Option<&str> {
        self.r#abstract.as_deref()
    }

    /// Preprint URL when an external identifier exists, else the index permalink
    pub fn primary_link(&self) -> &str {
        &self.primary_link
    }

    /// External preprint identifier
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Citation-export text, present only when enrichment succeeded
    pub fn export_text(&self) -> Option<&str> {
        self.export_text.as_deref()
    }

    /// Whether export-dependent actions (copy) are available
    pub fn has_export(&self) -> bool {
        self.export_text.is_some()
    }

    /// Whether enrichment failed for this record
    pub fn is_degraded(&self) -> bool {
        self.export_text.is_none()
    }
}

/// Builder for constructing PublicationRecord objects
#[derive(Debug, Clone)]
pub struct PublicationRecordBuilder {
    record: PublicationRecord,
}

impl PublicationRecordBuilder {
    /// Create a new builder with required fields
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        primary_link: impl Into<String>,
    ) -> Self {
        Self {
            record: PublicationRecord {
                id: id.into(),
                title: title.into(),
                authors: Vec::new(),
                r#abstract: None,
                primary_link: primary_link.into(),
                external_id: None,
                export_text: None,
            },
        }
    }

    /// Set authors
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.record.authors = authors;
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: Option<String>) -> Self {
        self.record.r#abstract = abstract_text;
        self
    }

    /// Set external identifier
    pub fn external_id(mut self, id: Option<String>) -> Self {
        self.record.external_id = id;
        self
    }

    /// Set export text
    pub fn export_text(mut self, text: impl Into<String>) -> Self {
        self.record.export_text = Some(text.into());
        self
    }

    /// Build the PublicationRecord
    pub fn build(self) -> PublicationRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = PublicationRecordBuilder::new("1", "Title", "https://arxiv.org/pdf/2301.1")
            .authors(vec!["Hirst, Edward".to_string()])
            .external_id(Some("2301.1".to_string()))
            .export_text("@article{x}")
            .build();

        assert_eq!(record.id(), "1");
        assert_eq!(record.authors(), ["Hirst, Edward".to_string()]);
        assert!(record.has_export());
        assert!(!record.is_degraded());
    }

    #[test]
    fn test_degraded_record() {
        let record = PublicationRecordBuilder::new("1", "Title", "https://example.com").build();
        assert!(record.is_degraded());
        assert!(record.export_text().is_none());
        assert!(record.abstract_text().is_none());
    }
}
