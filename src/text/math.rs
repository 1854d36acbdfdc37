//! Inline-math delimiter rewriting.
//!
//! Titles and abstracts use TeX-style `$..$` and `$$..$$`. The typesetting pass
//! expects `\(..\)` and `\[..\]`, and already understands MathML, so
//! `<math>..</math>` spans are lifted out before rewriting and put back after.
//! The placeholder tokens are fenced by a private-use character that does not
//! occur in the input.

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn native_math() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<math(?:\s[^>]*)?>.*?</math>").expect("valid regex"))
}

fn display_math() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\$([^$]+)\$\$").expect("valid regex"))
}

fn inline_math() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([^$]+)\$").expect("valid regex"))
}

/// First private-use character absent from `text`, used to fence placeholders
fn unused_marker(text: &str) -> Option<char> {
    ('\u{E000}'..='\u{F8FF}').find(|c| !text.contains(*c))
}

fn rewrite_dollars(text: &str) -> String {
    let rewritten = display_math().replace_all(text, |caps: &Captures| format!(r"\[{}\]", &caps[1]));
    inline_math()
        .replace_all(&rewritten, |caps: &Captures| format!(r"\({}\)", &caps[1]))
        .into_owned()
}

/// Rewrite dollar-delimited math for the typesetting pass.
///
/// `$$..$$` becomes `\[..\]` and is handled before `$..$`, which becomes
/// `\(..\)`. MathML spans come back byte-for-byte.
///
/// ```
/// use research_feed::text::render_math;
///
/// assert_eq!(render_math("$x^2$"), r"\(x^2\)");
/// assert_eq!(render_math("$$x^2$$"), r"\[x^2\]");
/// ```
pub fn render_math(text: &str) -> String {
    if !native_math().is_match(text) {
        return rewrite_dollars(text);
    }

    // The marker never occurs in `text`.
    let Some(marker) = unused_marker(text) else {
        return rewrite_between_spans(text);
    };

    let mut protected: Vec<String> = Vec::new();
    let lifted = native_math().replace_all(text, |caps: &Captures| {
        protected.push(caps.get(0).map_or("", |m| m.as_str()).to_string());
        format!("{}{}{}", marker, protected.len() - 1, marker)
    });

    let rewritten = rewrite_dollars(&lifted);

    let mut restored = String::with_capacity(rewritten.len());
    for (i, part) in rewritten.split(marker).enumerate() {
        if i % 2 == 0 {
            restored.push_str(part);
            continue;
        }
        match part.parse::<usize>().ok().and_then(|n| protected.get(n)) {
            Some(span) => restored.push_str(span),
            None => {
                restored.push(marker);
                restored.push_str(part);
                restored.push(marker);
            }
        }
    }
    restored
}

/// Rewrite only the text between MathML spans
fn rewrite_between_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in native_math().find_iter(text) {
        out.push_str(&rewrite_dollars(&text[last..span.start()]));
        out.push_str(span.as_str());
        last = span.end();
    }
    out.push_str(&rewrite_dollars(&text[last..]));
    out
}
