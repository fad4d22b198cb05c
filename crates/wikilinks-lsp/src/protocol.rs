use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::notification::Notification;
use tower_lsp::lsp_types::{Position, Url};

pub const NEW_NOTE_COMMAND: &str = "wikilinks.newNote";
pub const NEW_NOTE_FROM_SELECTION_COMMAND: &str = "wikilinks.newNoteFromSelection";

/// Server → client: the cursor is still inside a link after an edit, open
/// the suggestion widget again.
pub enum TriggerSuggest {}

impl Notification for TriggerSuggest {
    type Params = TriggerSuggestParams;
    const METHOD: &'static str = "wikilinks/triggerSuggest";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSuggestParams {
    pub uri: Url,
    pub position: Position,
}

/// Result of the new-note commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNoteResult {
    pub uri: Url,
    /// `false` when a note with that name already existed
    pub created: bool,
}

/// `data` attached to completion items, read back on resolve
#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionData {
    pub path: std::path::PathBuf,
}
