use std::time::Duration;

use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use wikilinks_core::model::Point;
use wikilinks_core::parser::link_or_open_at_point;
use wikilinks_core::utils::is_note_path;

use crate::conversion::{apply_content_change, point_to_lsp_position, uri_to_path};
use crate::protocol::{TriggerSuggest, TriggerSuggestParams};
use crate::state::GlobalState;

/// Quiet period after an edit before suggestions are re-triggered.
const LIVE_SUGGEST_DELAY: Duration = Duration::from_millis(100);

/// Handle "textDocument/didOpen" notification
pub async fn handle_did_open(state: &GlobalState, params: DidOpenTextDocumentParams) {
    let mut cache = state.document_cache.write().await;
    cache.insert(params.text_document.uri, params.text_document.text);
}

/// Handle "textDocument/didChange" notification
pub async fn handle_did_change(
    client: &Client,
    state: &GlobalState,
    params: DidChangeTextDocumentParams,
) {
    let uri = params.text_document.uri;

    let cursor = {
        let mut cache = state.document_cache.write().await;
        let Some(text) = cache.get_mut(&uri) else {
            log::debug!("Change for unopened document {}", uri);
            return;
        };
        let mut cursor = None;
        for change in &params.content_changes {
            cursor = apply_content_change(text, change);
        }
        cursor
    };

    let generation = {
        let mut generations = state.edit_generations.write().await;
        let generation = generations.entry(uri.clone()).or_insert(0);
        *generation += 1;
        *generation
    };

    let Some(cursor) = cursor else {
        return;
    };
    if !state.settings().await.wiki_links.trigger_live_suggest_on_edit {
        return;
    }

    let client = client.clone();
    let state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(LIVE_SUGGEST_DELAY).await;
        if still_in_link(&state, &uri, generation, cursor).await {
            client
                .send_notification::<TriggerSuggest>(TriggerSuggestParams {
                    uri,
                    position: point_to_lsp_position(cursor),
                })
                .await;
        }
    });
}

/// No newer edit arrived and `cursor` still sits inside a link token,
/// closed or still being typed, as completion sees it.
pub(crate) async fn still_in_link(
    state: &GlobalState,
    uri: &Url,
    generation: u64,
    cursor: Point,
) -> bool {
    if state.edit_generations.read().await.get(uri) != Some(&generation) {
        return false;
    }
    let cache = state.document_cache.read().await;
    cache
        .get(uri)
        .map(|text| link_or_open_at_point(text, cursor).is_wiki_link())
        .unwrap_or(false)
}

/// Handle "textDocument/didClose" notification
pub async fn handle_did_close(state: &GlobalState, params: DidCloseTextDocumentParams) {
    let uri = params.text_document.uri;
    state.document_cache.write().await.remove(&uri);
    state.edit_generations.write().await.remove(&uri);
}

/// Handle "textDocument/didSave" notification
///
/// Saving an untitled buffer can bring a new note into existence.
pub async fn handle_did_save(state: &GlobalState, params: DidSaveTextDocumentParams) {
    let is_note = uri_to_path(&params.text_document.uri)
        .map(|path| is_note_path(&path))
        .unwrap_or(false);
    if is_note {
        state.invalidate().await;
    }
}

/// Handle "workspace/didChangeWatchedFiles" notification
///
/// Content changes leave the note list alike; creations and deletions do not.
pub async fn handle_did_change_watched_files(
    state: &GlobalState,
    params: DidChangeWatchedFilesParams,
) {
    let structural = params
        .changes
        .iter()
        .any(|change| change.typ != FileChangeType::CHANGED);
    if structural {
        log::debug!("{} watched file events, refreshing note index", params.changes.len());
        state.invalidate().await;
    }
}

/// Handle "workspace/didRenameFiles" notification
pub async fn handle_did_rename_files(state: &GlobalState, params: RenameFilesParams) {
    {
        let mut cache = state.document_cache.write().await;
        for file_rename in &params.files {
            let (Ok(old_uri), Ok(new_uri)) = (
                file_rename.old_uri.parse::<Url>(),
                file_rename.new_uri.parse::<Url>(),
            ) else {
                continue;
            };
            if let Some(text) = cache.remove(&old_uri) {
                cache.insert(new_uri, text);
            }
        }
    }
    state.invalidate().await;
}
