use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Core internal coordinate system (0-based)
/// Does not directly use LSP Position to avoid coupling.
/// Columns are UTF-16 code units, same as the editor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub line: u32,
    pub col: u32,
}

impl Point {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Point,
    pub end: Point,
}

impl TextRange {
    pub fn on_line(line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: Point::new(line, start_col),
            end: Point::new(line, end_col),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    /// `[[target]]`, complete or being typed
    WikiLink,
    /// Cursor is not inside an actionable link token
    Null,
}

/// What the parser found under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    pub kind: LinkKind,
    pub raw_text: String,
    /// Span to replace on completion. Excludes the brackets.
    pub replace_range: Option<TextRange>,
}

impl LinkReference {
    pub fn null() -> Self {
        Self {
            kind: LinkKind::Null,
            raw_text: String::new(),
            replace_range: None,
        }
    }

    pub fn wiki_link(raw_text: impl Into<String>, replace_range: TextRange) -> Self {
        Self {
            kind: LinkKind::WikiLink,
            raw_text: raw_text.into(),
            replace_range: Some(replace_range),
        }
    }

    pub fn is_wiki_link(&self) -> bool {
        self.kind == LinkKind::WikiLink
    }
}

/// How link text maps onto a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamingConvention {
    /// `[[note]]` resolves by file basename anywhere in the workspace
    #[default]
    #[serde(rename = "uniqueFilenames")]
    UniqueBasename,
    /// `[[sub/note]]` resolves relative to the linking document
    #[serde(rename = "relativePaths")]
    RelativePath,
}

/// A completion candidate, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub path: PathBuf,
    /// Display name, also the inserted text
    pub label: String,
    /// Raw query followed by the label, for client-side narrowing
    pub filter_text: String,
    /// Normalized display name, file name and workspace-relative path
    pub normalized_keys: Vec<String>,
    /// Dissimilarity, lower is better
    pub score: f64,
}

/// Result of a completion request: the link under the cursor and its candidates.
#[derive(Debug, Clone)]
pub struct Completion {
    pub link: LinkReference,
    pub candidates: Vec<CandidateDocument>,
}

impl Completion {
    pub fn empty() -> Self {
        Self {
            link: LinkReference::null(),
            candidates: Vec::new(),
        }
    }
}

/// An occurrence of a wiki-link token inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// Full token range, brackets included
    pub range: TextRange,
    pub text: String,
}
