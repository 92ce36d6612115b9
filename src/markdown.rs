//! Small helpers for the Markdown report printed by the CLI.

/// `[text](url)` with brackets and parentheses escaped in both parts.
pub(crate) fn link(text: &str, url: &str) -> String {
    format!("[{}]({})", escape_link_part(text), escape_link_part(url))
}

/// A level-1 heading. Line breaks would end the heading early, so they
/// become spaces.
pub(crate) fn heading(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c })
        .collect();
    format!("# {}", flat.trim())
}

fn escape_link_part(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
