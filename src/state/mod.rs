//! Presentation state for a fetched batch.
//!
//! [`DisplayState`] is a plain value. Every transition consumes the current
//! state and returns the next one, so the machine can be driven and tested
//! without any rendering surface:
//!
//! ```text
//! Loading --fetch_succeeded--> Ready(records)
//! Loading --fetch_failed-----> Failed(message)
//! *       --start_fetch------> Loading
//! ```
//!
//! `toggle_abstract` and `toggle_show_all` only act in `Ready`.

mod render;

pub use render::{render_visible, RenderedRecord};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::PublicationRecord;
use crate::text::DEFAULT_AUTHOR_LIMIT;
use crate::utils::Clipboard;

/// Records shown before "show all" is toggled
pub const DEFAULT_WINDOW: usize = 3;

/// Records requested from the index per activation
pub const DEFAULT_MAX_PUBLICATIONS: usize = 6;

/// Presentation constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Size of the default prefix window
    #[serde(default = "default_window")]
    pub default_window: usize,

    /// Records requested per fetch
    #[serde(default = "default_max_publications")]
    pub max_publications: usize,

    /// Authors listed before "et al."
    #[serde(default = "default_author_limit")]
    pub author_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_window: default_window(),
            max_publications: default_max_publications(),
            author_limit: default_author_limit(),
        }
    }
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_max_publications() -> usize {
    DEFAULT_MAX_PUBLICATIONS
}

fn default_author_limit() -> usize {
    DEFAULT_AUTHOR_LIMIT
}

/// Fetch lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Batch fetch in progress
    Loading,
    /// Batch fetched
    Ready(Vec<PublicationRecord>),
    /// Batch fetch failed with a user-facing message
    Failed(String),
}

/// Which prefix of the records is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// The configured default window
    Default,
    /// Every fetched record
    All,
}

/// User-driven and fetch-driven events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    StartFetch,
    FetchSucceeded(Vec<PublicationRecord>),
    FetchFailed(String),
    ToggleAbstract(usize),
    ToggleShowAll,
}

/// Result of a copy action; the state never changes because of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Export text written to the clipboard
    Copied,
    /// No record at that index, or it has no export text
    Unavailable,
    /// The clipboard refused the write
    Failed,
}

/// UI-only state for one pipeline activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    phase: Phase,
    window: Window,
    expanded: BTreeMap<usize, bool>,
    config: DisplayConfig,
}

impl DisplayState {
    /// Initial state: loading, default window, nothing expanded
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            phase: Phase::Loading,
            window: Window::Default,
            expanded: BTreeMap::new(),
            config,
        }
    }

    /// Apply one event
    #[must_use]
    pub fn apply(self, event: DisplayEvent) -> Self {
        match event {
            DisplayEvent::StartFetch => self.start_fetch(),
            DisplayEvent::FetchSucceeded(records) => self.fetch_succeeded(records),
            DisplayEvent::FetchFailed(message) => self.fetch_failed(message),
            DisplayEvent::ToggleAbstract(index) => self.toggle_abstract(index),
            DisplayEvent::ToggleShowAll => self.toggle_show_all(),
        }
    }

    /// Enter `Loading` and reset the window and expansion to their initial values
    #[must_use]
    pub fn start_fetch(mut self) -> Self {
        self.phase = Phase::Loading;
        self.window = Window::Default;
        self.expanded.clear();
        self
    }

    /// `Loading -> Ready`
    #[must_use]
    pub fn fetch_succeeded(mut self, records: Vec<PublicationRecord>) -> Self {
        if self.phase != Phase::Loading {
            tracing::warn!("Ignoring fetch result outside of loading state");
            return self;
        }
        tracing::debug!("Loaded {} publications", records.len());
        self.phase = Phase::Ready(records);
        self
    }

    /// `Loading -> Failed`
    #[must_use]
    pub fn fetch_failed(mut self, message: impl Into<String>) -> Self {
        if self.phase != Phase::Loading {
            tracing::warn!("Ignoring fetch failure outside of loading state");
            return self;
        }
        self.phase = Phase::Failed(message.into());
        self
    }

    /// Flip the abstract expansion of record `index`.
    ///
    /// No effect outside `Ready` or for indices past the fetched records.
    #[must_use]
    pub fn toggle_abstract(mut self, index: usize) -> Self {
        if index >= self.records().len() {
            return self;
        }
        let entry = self.expanded.entry(index).or_insert(false);
        *entry = !*entry;
        self
    }

    /// Switch between the default window and every fetched record. Never re-fetches.
    #[must_use]
    pub fn toggle_show_all(mut self) -> Self {
        if !matches!(self.phase, Phase::Ready(_)) {
            return self;
        }
        self.window = match self.window {
            Window::Default => Window::All,
            Window::All => Window::Default,
        };
        self
    }

    /// Copy record `index`'s export text to `clipboard`.
    ///
    /// Failures are logged; the state is never modified.
    pub fn copy_export_text(&self, index: usize, clipboard: &mut dyn Clipboard) -> CopyOutcome {
        let Some(text) = self.records().get(index).and_then(|r| r.export_text()) else {
            tracing::debug!("No export text for record {}", index);
            return CopyOutcome::Unavailable;
        };

        match clipboard.write_text(text) {
            Ok(()) => CopyOutcome::Copied,
            Err(e) => {
                tracing::warn!("Failed to copy text: {}", e);
                CopyOutcome::Failed
            }
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Presentation constants
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Whether a fetch is in progress
    pub fn loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// User-facing error message of a failed fetch
    pub fn batch_error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Every fetched record; empty unless `Ready`
    pub fn records(&self) -> &[PublicationRecord] {
        match &self.phase {
            Phase::Ready(records) => records,
            _ => &[],
        }
    }

    /// Current window selection
    pub fn window(&self) -> Window {
        self.window
    }

    /// Whether every record is shown
    pub fn showing_all(&self) -> bool {
        self.window == Window::All
    }

    /// Length of the visible prefix
    pub fn visible_count(&self) -> usize {
        let total = self.records().len();
        match self.window {
            Window::Default => self.config.default_window.min(total),
            Window::All => total,
        }
    }

    /// The visible prefix of the fetched records
    pub fn visible_records(&self) -> &[PublicationRecord] {
        &self.records()[..self.visible_count()]
    }

    /// Whether the show-all control is worth offering
    pub fn can_toggle_show_all(&self) -> bool {
        self.records().len() > self.config.default_window
    }

    /// Label for the show-all control
    pub fn show_all_label(&self) -> &'static str {
        if self.showing_all() {
            "Show Less"
        } else {
            "Show More Publications"
        }
    }

    /// Raw expansion flag at `index` (absent means collapsed)
    pub fn expansion(&self, index: usize) -> bool {
        self.expanded.get(&index).copied().unwrap_or(false)
    }

    /// Whether record `index`'s abstract should be shown
    pub fn is_expanded(&self, index: usize) -> bool {
        self.expansion(index)
            && self
                .records()
                .get(index)
                .is_some_and(|r| r.abstract_text().is_some())
    }

    /// Indices whose abstracts are currently shown
    pub fn expanded_indices(&self) -> Vec<usize> {
        self.expanded
            .iter()
            .filter(|(index, open)| **open && self.is_expanded(**index))
            .map(|(index, _)| *index)
            .collect()
    }
}
