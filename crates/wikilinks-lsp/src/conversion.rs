//! Conversion utilities between Core types and LSP types
//!
//! Core points already count columns in UTF-16 code units, so position
//! conversion is a field rename.

use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent};
use url::Url;
use wikilinks_core::line_map::{self, LineMap};
use wikilinks_core::model::{Point, TextRange};

/// Convert LSP Position to Core Point
pub fn lsp_position_to_point(position: Position) -> Point {
    Point {
        line: position.line,
        col: position.character,
    }
}

/// Convert Core Point to LSP Position
pub fn point_to_lsp_position(point: Point) -> Position {
    Position {
        line: point.line,
        character: point.col,
    }
}

/// Convert Core TextRange to LSP Range
pub fn text_range_to_lsp_range(range: TextRange) -> Range {
    Range {
        start: point_to_lsp_position(range.start),
        end: point_to_lsp_position(range.end),
    }
}

pub fn path_to_uri(path: &Path) -> Option<Url> {
    Url::from_file_path(path).ok()
}

pub fn uri_to_path(uri: &Url) -> Option<PathBuf> {
    uri.to_file_path().ok()
}

/// Apply one `didChange` content change to `text`.
///
/// Returns where the cursor ends up after a ranged edit, `None` for a full
/// replacement or a range outside the document.
pub fn apply_content_change(text: &mut String, change: &TextDocumentContentChangeEvent) -> Option<Point> {
    let Some(range) = change.range else {
        *text = change.text.clone();
        return None;
    };

    let map = LineMap::new(text);
    let start_point = lsp_position_to_point(range.start);
    let Some(start) = map.point_to_offset(text, start_point) else {
        log::warn!("Dropping edit outside the document: {:?}", range);
        return None;
    };
    let end = map
        .point_to_offset(text, lsp_position_to_point(range.end))
        .unwrap_or(text.len());

    text.replace_range(start.min(end)..start.max(end), &change.text);
    Some(line_map::advance(start_point, &change.text))
}

/// Extract the text covered by `range`.
pub fn text_in_range(text: &str, range: Range) -> Option<String> {
    let map = LineMap::new(text);
    let start = map.point_to_offset(text, lsp_position_to_point(range.start))?;
    let end = map.point_to_offset(text, lsp_position_to_point(range.end))?;
    Some(text[start.min(end)..start.max(end)].to_string())
}
