//! Author name abbreviation and list truncation.

/// Number of authors listed before truncating with "et al."
pub const DEFAULT_AUTHOR_LIMIT: usize = 8;

/// Abbreviate `"Last, First Middle"` to `"Last, F.M."`.
///
/// Initials keep the case they had. Names that are not exactly two
/// `", "`-separated parts, or that have no given names, are returned unchanged.
///
/// ```
/// use research_feed::text::abbreviate_author;
///
/// assert_eq!(abbreviate_author("Hirst, Edward Charles"), "Hirst, E.C.");
/// assert_eq!(abbreviate_author("Unknown"), "Unknown");
/// ```
pub fn abbreviate_author(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split(", ").collect();
    if parts.len() != 2 {
        return full_name.to_string();
    }

    let initials: String = parts[1]
        .split_whitespace()
        .filter_map(|name| name.chars().next())
        .map(|c| format!("{}.", c))
        .collect();

    if initials.is_empty() {
        return full_name.to_string();
    }

    format!("{}, {}", parts[0], initials)
}

/// Abbreviate every author and join with `", "`.
///
/// Lists longer than `limit` show the first `limit` names followed by `" et al."`.
pub fn format_author_list<S: AsRef<str>>(authors: &[S], limit: usize) -> String {
    let shown = authors
        .iter()
        .take(limit)
        .map(|a| abbreviate_author(a.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");

    if authors.len() > limit {
        format!("{} et al.", shown)
    } else {
        shown
    }
}
