//! Utility modules supporting the pipeline.
//!
//! - [`HttpClient`]: shared HTTP client with a configurable user agent and timeout
//! - [`Clipboard`]: clipboard capability used by the copy action
//! - [`SystemClipboard`]: desktop clipboard via the platform copy tool
//!
//! # HTTP Client
//!
//! ```rust,no_run
//! use research_feed::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let response = client.client().get("https://inspirehep.net/api/literature").send().await?;
//! # Ok(())
//! # }
//! ```

mod clipboard;
mod http;

pub use clipboard::{Clipboard, ClipboardError, CommandClipboard, SystemClipboard};
pub use http::{default_user_agent, HttpClient, DEFAULT_TIMEOUT_SECS};
