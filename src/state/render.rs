//! Derived view handed to the rendering host.

use serde::Serialize;

use crate::state::DisplayState;
use crate::text::{format_author_list, render_math};

/// One visible record, normalized for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRecord {
    /// Position in the fetched batch
    pub index: usize,
    /// Title with math delimiters rewritten
    pub title: String,
    /// Abbreviated, possibly truncated author list
    pub authors: String,
    /// Preprint or index link
    pub link: String,
    /// Whether the record has an abstract to toggle
    pub has_abstract: bool,
    /// Abstract with math delimiters rewritten, only while expanded
    pub r#abstract: Option<String>,
    /// Whether the copy action is offered
    pub can_copy: bool,
}

impl RenderedRecord {
    /// Text fragments that may need a typesetting pass
    pub fn math_fragments(&self) -> Vec<String> {
        let mut fragments = vec![self.title.clone()];
        if let Some(abstract_text) = &self.r#abstract {
            fragments.push(abstract_text.clone());
        }
        fragments
    }
}

/// Normalize the visible window of `state` for display.
pub fn render_visible(state: &DisplayState) -> Vec<RenderedRecord> {
    let author_limit = state.config().author_limit;

    state
        .visible_records()
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let expanded = state.is_expanded(index);
            RenderedRecord {
                index,
                title: render_math(record.title()),
                authors: format_author_list(record.authors(), author_limit),
                link: record.primary_link().to_string(),
                has_abstract: record.abstract_text().is_some(),
                r#abstract: record
                    .abstract_text()
                    .filter(|_| expanded)
                    .map(render_math),
                can_copy: record.has_export(),
            }
        })
        .collect()
}
