//! # Research Feed
//!
//! Fetches a researcher's most recent publications from a literature index,
//! enriches each one with citation-export text, and keeps the display state
//! (window, expanded abstracts, copy action) for whatever host renders them.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (PublicationRecord, IndexHit, etc.)
//! - [`sources`]: Literature index clients behind the [`LiteratureIndex`] trait
//! - [`feed`]: Batch fetch with concurrent per-record enrichment
//! - [`text`]: Author and inline-math normalization applied at render time
//! - [`state`]: Presentation state machine and the rendered view
//! - [`typeset`]: Best-effort math typesetting pass
//! - [`ui`]: Terminal, JSON and HTML output of the rendered view
//! - [`utils`]: HTTP client and clipboard access
//! - [`config`]: Configuration management

pub mod config;
pub mod feed;
pub mod models;
pub mod sources;
pub mod state;
pub mod text;
pub mod typeset;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use feed::{BatchError, BatchFetcher};
pub use models::PublicationRecord;
pub use sources::{LiteratureIndex, SourceError};
pub use state::DisplayState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
