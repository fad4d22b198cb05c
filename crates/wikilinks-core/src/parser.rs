//! Wiki-link token detection on a single line.
//!
//! Links are `[[` + one or more non-`]` characters + `]]` on one line.
//! Nested and multi-line tokens are not recognised.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::line_map::{byte_to_utf16_col, line_at, utf16_col_to_byte};
use crate::model::{LinkOccurrence, LinkReference, Point, TextRange};

static RX_WIKI_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[\[[^\]]+\]\]").unwrap());

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// Link under the cursor: a complete link containing the cursor, else an
/// empty `[[` right before it.
pub fn link_at(line_text: &str, line: u32, col: u32) -> LinkReference {
    let found = link_containing(line_text, line, col);
    if found.is_wiki_link() {
        return found;
    }
    empty_link_at(line_text, line, col)
}

/// Like [`link_at`], then falls back to an unclosed `[[` still being typed.
/// Used by completion.
pub fn link_or_open_at(line_text: &str, line: u32, col: u32) -> LinkReference {
    let found = link_at(line_text, line, col);
    if found.is_wiki_link() {
        return found;
    }
    open_link_at(line_text, line, col)
}

/// [`link_at`] on a whole document.
pub fn link_at_point(text: &str, point: Point) -> LinkReference {
    match line_at(text, point.line) {
        Some(line_text) => link_at(line_text, point.line, point.col),
        None => LinkReference::null(),
    }
}

/// [`link_or_open_at`] on a whole document.
pub fn link_or_open_at_point(text: &str, point: Point) -> LinkReference {
    match line_at(text, point.line) {
        Some(line_text) => link_or_open_at(line_text, point.line, point.col),
        None => LinkReference::null(),
    }
}

fn link_containing(line_text: &str, line: u32, col: u32) -> LinkReference {
    for m in RX_WIKI_LINK.find_iter(line_text) {
        let start = byte_to_utf16_col(line_text, m.start());
        let end = byte_to_utf16_col(line_text, m.end());
        if start <= col && col <= end {
            let inner = &m.as_str()[OPEN.len()..m.as_str().len() - CLOSE.len()];
            return LinkReference::wiki_link(
                inner,
                TextRange::on_line(line, start + 2, end - 2),
            );
        }
    }
    LinkReference::null()
}

fn empty_link_at(line_text: &str, line: u32, col: u32) -> LinkReference {
    let cursor = utf16_col_to_byte(line_text, col);
    let (before, after) = line_text.split_at(cursor);
    if before.ends_with(OPEN) && (after.is_empty() || after.starts_with(CLOSE)) {
        return LinkReference::wiki_link("", TextRange::on_line(line, col, col));
    }
    LinkReference::null()
}

fn open_link_at(line_text: &str, line: u32, col: u32) -> LinkReference {
    let cursor = utf16_col_to_byte(line_text, col);
    let before = &line_text[..cursor];

    let Some(open) = before.rfind(OPEN) else {
        return LinkReference::null();
    };

    let word = &before[open + OPEN.len()..];
    if word.contains(CLOSE) {
        return LinkReference::null();
    }

    let start = byte_to_utf16_col(line_text, open + OPEN.len());
    let end = byte_to_utf16_col(line_text, cursor);
    LinkReference::wiki_link(word, TextRange::on_line(line, start, end))
}

/// Every link token in `text`, ranges including the brackets.
pub fn scan_links(text: &str) -> Vec<LinkOccurrence> {
    let mut links = Vec::new();
    for (line, raw_line) in text.split('\n').enumerate() {
        let line_text = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        for m in RX_WIKI_LINK.find_iter(line_text) {
            let inner = &m.as_str()[OPEN.len()..m.as_str().len() - CLOSE.len()];
            links.push(LinkOccurrence {
                range: TextRange::on_line(
                    line as u32,
                    byte_to_utf16_col(line_text, m.start()),
                    byte_to_utf16_col(line_text, m.end()),
                ),
                text: inner.to_string(),
            });
        }
    }
    links
}
