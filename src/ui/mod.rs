//! Host-side output for the rendered view.
//!
//! The pipeline only produces [`RenderedRecord`]s plus [`DisplayState`] flags;
//! this module turns them into terminal text, JSON or an HTML fragment.

use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;

use crate::state::{DisplayState, RenderedRecord};

/// MathJax setup matching the `\(..\)` / `\[..\]` delimiters produced by the normalizer
pub const MATHJAX_CONFIG: &str = r#"window.MathJax = {
  startup: { typeset: false },
  tex: {
    inlineMath: [['\\(', '\\)']],
    displayMath: [['\\[', '\\]']],
    processEscapes: true
  },
  options: {
    skipHtmlTags: ['script', 'noscript', 'style', 'textarea', 'pre']
  }
};"#;

/// MathJax bundle loaded by the HTML fragment
pub const MATHJAX_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js";

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status icons for different outcomes.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Loading => "◐",
    }
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Loading,
}

/// Format a status line, colored when stdout is a terminal
pub fn status_line(status: Status, message: &str) -> String {
    let icon = status_icon(status);
    if !is_terminal() {
        return format!("{} {}", icon, message);
    }
    match status {
        Status::Success => format!("{} {}", icon.green().bold(), message),
        Status::Error => format!("{} {}", icon.red().bold(), message),
        Status::Warning => format!("{} {}", icon.yellow().bold(), message),
        Status::Info => format!("{} {}", icon.cyan().bold(), message),
        Status::Loading => format!("{} {}", icon.cyan(), message),
    }
}

/// Plain-text listing of the visible records
pub fn render_plain(state: &DisplayState, records: &[RenderedRecord], profile_url: &str) -> String {
    if state.loading() {
        return status_line(Status::Loading, "Loading publications...");
    }
    if let Some(error) = state.batch_error() {
        return status_line(Status::Error, error);
    }

    let color = is_terminal();
    let mut out = String::new();
    for record in records {
        let title = format!("[{}] {}", record.index, record.title);
        if color {
            out.push_str(&format!("{}\n", title.bold()));
        } else {
            out.push_str(&format!("{}\n", title));
        }
        out.push_str(&format!("    {}\n", record.authors));
        out.push_str(&format!("    {}\n", record.link));
        if let Some(abstract_text) = &record.r#abstract {
            out.push_str(&format!("\n    {}\n", abstract_text));
        }
        let mut actions = Vec::new();
        if record.has_abstract && record.r#abstract.is_none() {
            actions.push("abstract available");
        }
        if record.can_copy {
            actions.push("export available");
        }
        if !actions.is_empty() {
            out.push_str(&format!("    ({})\n", actions.join(", ")));
        }
        out.push('\n');
    }

    if state.can_toggle_show_all() {
        out.push_str(&format!(
            "{} of {} shown ({} with --all)\n",
            records.len(),
            state.records().len(),
            state.show_all_label()
        ));
    }
    out.push_str(&format!("Full publication list: {}\n", profile_url));
    out
}

#[derive(Serialize)]
struct JsonView<'a> {
    loading: bool,
    error: Option<&'a str>,
    total: usize,
    showing_all: bool,
    can_toggle_show_all: bool,
    profile_url: &'a str,
    records: &'a [RenderedRecord],
}

/// JSON document describing the view
pub fn render_json(
    state: &DisplayState,
    records: &[RenderedRecord],
    profile_url: &str,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonView {
        loading: state.loading(),
        error: state.batch_error(),
        total: state.records().len(),
        showing_all: state.showing_all(),
        can_toggle_show_all: state.can_toggle_show_all(),
        profile_url,
        records,
    })
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// HTML fragment with the MathJax setup, ready to embed in a page.
///
/// Titles and abstracts are emitted as markup so embedded MathML renders;
/// authors and links are escaped.
pub fn render_html(state: &DisplayState, records: &[RenderedRecord], profile_url: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<script>\n{}\n</script>\n", MATHJAX_CONFIG));
    out.push_str(&format!(
        "<script id=\"MathJax-script\" async src=\"{}\"></script>\n",
        MATHJAX_SCRIPT_URL
    ));
    out.push_str("<section id=\"publications\">\n");

    if state.loading() {
        out.push_str("  <p class=\"loading\">Loading publications...</p>\n");
    } else if let Some(error) = state.batch_error() {
        out.push_str(&format!("  <p class=\"error\">{}</p>\n", escape_html(error)));
    } else {
        for record in records {
            out.push_str("  <article class=\"publication\">\n");
            out.push_str(&format!(
                "    <h3><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></h3>\n",
                escape_html(&record.link),
                record.title
            ));
            out.push_str(&format!(
                "    <p class=\"authors\">{}</p>\n",
                escape_html(&record.authors)
            ));
            if let Some(abstract_text) = &record.r#abstract {
                out.push_str(&format!("    <p class=\"abstract\">{}</p>\n", abstract_text));
            }
            out.push_str("  </article>\n");
        }
        out.push_str(&format!(
            "  <a class=\"profile\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">View Full Publication List on Inspire</a>\n",
            escape_html(profile_url)
        ));
    }

    out.push_str("</section>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublicationRecordBuilder;
    use crate::state::{render_visible, DisplayConfig};

    fn ready() -> DisplayState {
        let records = (0..4)
            .map(|i| {
                PublicationRecordBuilder::new(i.to_string(), format!("Title $x_{}$", i), format!("https://x/{}", i))
                    .authors(vec!["O'Brien, Anne".to_string()])
                    .abstract_text(Some("Abstract".to_string()))
                    .export_text("@article{a}")
                    .build()
            })
            .collect();
        DisplayState::new(DisplayConfig::default()).fetch_succeeded(records)
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_plain_output() {
        let state = ready();
        let rendered = render_visible(&state);
        let out = render_plain(&state, &rendered, "https://profile");
        assert!(out.contains(r"Title \(x_0\)"));
        assert!(out.contains("O'Brien, A."));
        assert!(out.contains("3 of 4 shown"));
        assert!(out.contains("https://profile"));
    }

    #[test]
    fn test_plain_error() {
        let state = DisplayState::new(DisplayConfig::default()).fetch_failed("Failed to load");
        let out = render_plain(&state, &[], "https://profile");
        assert!(out.contains("Failed to load"));
    }

    #[test]
    fn test_json_output() {
        let state = ready().toggle_show_all();
        let rendered = render_visible(&state);
        let json = render_json(&state, &rendered, "https://profile").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 4);
        assert_eq!(value["showing_all"], true);
        assert_eq!(value["records"].as_array().unwrap().len(), 4);
        assert_eq!(value["records"][0]["can_copy"], true);
    }

    #[test]
    fn test_html_output() {
        let state = ready().toggle_abstract(0);
        let rendered = render_visible(&state);
        let html = render_html(&state, &rendered, "https://profile");
        assert!(html.contains("inlineMath"));
        assert!(html.contains(MATHJAX_SCRIPT_URL));
        assert!(html.contains("O&#39;Brien, A."));
        assert!(html.contains("<p class=\"abstract\">Abstract</p>"));
        assert_eq!(html.matches("<article").count(), 3);
    }
}
