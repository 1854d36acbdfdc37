//! Index query and raw hit models.

use serde::{Deserialize, Serialize};

/// Citation-export representation requested during enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// BibTeX entry
    #[default]
    Bibtex,
    /// LaTeX (European style) bibitem
    LatexEu,
    /// LaTeX (US style) bibitem
    LatexUs,
}

impl ExportFormat {
    /// Value of the index's `format` query parameter
    pub fn id(&self) -> &'static str {
        match self {
            ExportFormat::Bibtex => "bibtex",
            ExportFormat::LatexEu => "latex-eu",
            ExportFormat::LatexUs => "latex-us",
        }
    }

    /// Human-readable name, used for copy labels
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Bibtex => "BibTeX",
            ExportFormat::LatexEu => "LaTeX (EU)",
            ExportFormat::LatexUs => "LaTeX (US)",
        }
    }

    /// Check that an export payload looks like this format.
    ///
    /// Empty payloads are never valid; BibTeX must start with an `@` entry.
    pub fn is_well_formed(&self, payload: &str) -> bool {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return false;
        }
        match self {
            ExportFormat::Bibtex => trimmed.starts_with('@'),
            ExportFormat::LatexEu | ExportFormat::LatexUs => true,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Query for the most recent records of one author identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentQuery {
    /// Index search expression selecting the author (e.g. `a Edward.Hirst.1`)
    pub author: String,

    /// Maximum number of records to return, most recent first
    pub max_results: usize,
}

impl RecentQuery {
    /// Create a new query for an author identity
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            max_results: 6,
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }
}

/// One raw record returned by the index query, before enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHit {
    /// Index-assigned identifier
    pub id: String,

    /// Title, may contain inline math markup
    pub title: String,

    /// Raw `"Last, First Middle"` author names in index order
    pub authors: Vec<String>,

    /// Abstract, may contain inline math markup
    pub r#abstract: Option<String>,

    /// External preprint identifier (e.g. an arXiv number)
    pub external_id: Option<String>,
}

impl IndexHit {
    /// Create a hit with the required fields
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            r#abstract: None,
            external_id: None,
        }
    }

    /// Set authors
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.r#abstract = Some(abstract_text.into());
        self
    }

    /// Set external identifier
    pub fn external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_ids() {
        assert_eq!(ExportFormat::Bibtex.id(), "bibtex");
        assert_eq!(ExportFormat::LatexEu.id(), "latex-eu");
        assert_eq!(ExportFormat::default(), ExportFormat::Bibtex);
    }

    #[test]
    fn test_bibtex_well_formed() {
        assert!(ExportFormat::Bibtex.is_well_formed("@article{Hirst:2023abc,\n}"));
        assert!(ExportFormat::Bibtex.is_well_formed("\n  @article{x}"));
        assert!(!ExportFormat::Bibtex.is_well_formed("<html>error</html>"));
        assert!(!ExportFormat::Bibtex.is_well_formed("   "));
        assert!(ExportFormat::LatexEu.is_well_formed("%\\cite{x}"));
        assert!(!ExportFormat::LatexUs.is_well_formed(""));
    }

    #[test]
    fn test_hit_builder() {
        let hit = IndexHit::new("42", "Title")
            .authors(["Hirst, Edward", "Doe, Jane"])
            .external_id("2301.12345");
        assert_eq!(hit.authors.len(), 2);
        assert_eq!(hit.external_id.as_deref(), Some("2301.12345"));
        assert!(hit.r#abstract.is_none());
    }
}
