//! Display helpers for publication cards and detail pages.

use chrono::{DateTime, Utc};

/// Shortens `text` to at most `max_chars` characters, cutting at a word
/// boundary when possible and appending an ellipsis.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let at_boundary = text
        .chars()
        .nth(max_chars)
        .is_some_and(char::is_whitespace);
    let cut = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 && !at_boundary => &cut[..pos],
        _ => cut.as_str(),
    };

    format!("{}…", cut.trim_end())
}

/// Formats a timestamp as a long calendar date, e.g. `March 4, 2025`.
pub fn long_date(ts: &DateTime<Utc>) -> String {
    ts.format("%B %-d, %Y").to_string()
}

/// True for absolute `http`/`https` URLs with a host.
pub fn is_web_link(link: &str) -> bool {
    url::Url::parse(link.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false)
}
