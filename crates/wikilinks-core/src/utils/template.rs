//! `${noteName}` / `${timestamp}` substitution for new-note templates.

use std::fmt::Write;

pub const NOTE_NAME: &str = "${noteName}";
pub const TIMESTAMP: &str = "${timestamp}";

/// Replace every placeholder in `template`.
///
/// ```
/// use wikilinks_core::utils::template::render;
///
/// assert_eq!(render("# ${noteName}\n\n", "Ideas", "2024-01-01"), "# Ideas\n\n");
/// assert_eq!(render("${timestamp}-${noteName}", "x", "now"), "now-x");
/// ```
pub fn render(template: &str, note_name: &str, timestamp: &str) -> String {
    template
        .replace(NOTE_NAME, note_name)
        .replace(TIMESTAMP, timestamp)
}

/// Current local time formatted with a strftime pattern.
/// Falls back to RFC 3339 when the pattern is invalid.
pub fn timestamp(format: &str) -> String {
    let now = chrono::Local::now();
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        log::warn!("Invalid timestamp format {:?}, using RFC 3339", format);
        return now.to_rfc3339();
    }
    out
}
