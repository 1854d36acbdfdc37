//! Core data models for index hits, queries and publication records.

mod query;
mod record;

pub use query::{ExportFormat, IndexHit, RecentQuery};
pub use record::{PublicationRecord, PublicationRecordBuilder};
