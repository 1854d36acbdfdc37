//! Text normalization applied at render time.
//!
//! Everything here is pure: the same input always produces the same output and
//! nothing is written back to the record, so re-rendering is idempotent.
//!
//! - [`abbreviate_author`] / [`format_author_list`]: `"Last, First Middle"` to `"Last, F.M."`
//! - [`render_math`]: rewrite `$..$` and `$$..$$` into `\(..\)` and `\[..\]`
//!   while leaving `<math>..</math>` markup untouched

mod authors;
mod math;

pub use authors::{abbreviate_author, format_author_list, DEFAULT_AUTHOR_LIMIT};
pub use math::render_math;
