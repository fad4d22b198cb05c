use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tower_lsp::jsonrpc::{Error, ErrorCode, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use wikilinks_core::{NewNote, NoteError};

use super::run_blocking;
use crate::conversion::{path_to_uri, text_in_range, uri_to_path};
use crate::protocol::{NewNoteResult, NEW_NOTE_COMMAND, NEW_NOTE_FROM_SELECTION_COMMAND};
use crate::state::GlobalState;

/// Handle "workspace/executeCommand" request
pub async fn handle_execute_command(
    client: &Client,
    state: &GlobalState,
    params: ExecuteCommandParams,
) -> Result<Option<serde_json::Value>> {
    match params.command.as_str() {
        NEW_NOTE_COMMAND => handle_new_note(state, params).await,
        NEW_NOTE_FROM_SELECTION_COMMAND => handle_new_note_from_selection(client, state, params).await,
        other => Err(Error::invalid_params(format!("Unknown command: {}", other))),
    }
}

fn argument<T: DeserializeOwned>(params: &ExecuteCommandParams, index: usize, name: &str) -> Result<T> {
    let value = params
        .arguments
        .get(index)
        .ok_or_else(|| Error::invalid_params(format!("Missing argument: {}", name)))?;
    serde_json::from_value(value.clone())
        .map_err(|_| Error::invalid_params(format!("Invalid {} argument", name)))
}

/// `wikilinks.newNote [title, uri?]`
pub async fn handle_new_note(
    state: &GlobalState,
    params: ExecuteCommandParams,
) -> Result<Option<serde_json::Value>> {
    let title: String = argument(&params, 0, "title")?;
    let active_document = match params.arguments.get(1) {
        Some(serde_json::Value::Null) | None => None,
        Some(_) => uri_to_path(&argument::<Url>(&params, 1, "uri")?),
    };

    let note = create_note(state, title, active_document).await?;
    note_result(&note).map(Some)
}

/// `wikilinks.newNoteFromSelection [uri, range]`: the selected text becomes
/// the title and is replaced by a link to the new note.
pub async fn handle_new_note_from_selection(
    client: &Client,
    state: &GlobalState,
    params: ExecuteCommandParams,
) -> Result<Option<serde_json::Value>> {
    let uri: Url = argument(&params, 0, "uri")?;
    let range: Range = argument(&params, 1, "range")?;

    let text = state
        .document_text(&uri)
        .await
        .ok_or_else(|| Error::invalid_params(format!("Unknown document: {}", uri)))?;
    let title = text_in_range(&text, range)
        .map(|selection| selection.trim().to_string())
        .filter(|selection| !selection.is_empty())
        .ok_or_else(|| Error::invalid_params("Selection is empty"))?;

    let note = create_note(state, title, uri_to_path(&uri)).await?;

    let edit = WorkspaceEdit {
        changes: Some(HashMap::from([(
            uri,
            vec![TextEdit {
                range,
                new_text: note.link_text.clone(),
            }],
        )])),
        ..Default::default()
    };
    match client.apply_edit(edit).await {
        Ok(response) if response.applied => {}
        Ok(response) => log::warn!(
            "Client did not replace the selection: {}",
            response.failure_reason.unwrap_or_default()
        ),
        Err(e) => log::warn!("Failed to replace the selection: {}", e),
    }

    note_result(&note).map(Some)
}

async fn create_note(
    state: &GlobalState,
    title: String,
    active_document: Option<std::path::PathBuf>,
) -> Result<NewNote> {
    let workspace = state.workspace().await.ok_or_else(|| Error {
        code: ErrorCode::InternalError,
        message: "Workspace not initialized".into(),
        data: None,
    })?;
    let settings = state.settings().await;

    run_blocking(move |cancel| {
        workspace.new_note(&title, active_document.as_deref(), &settings.wiki_links, cancel)
    })
    .await?
    .map_err(|e| match e {
        NoteError::EmptyTitle(_) => Error::invalid_params(e.to_string()),
        other => Error {
            code: ErrorCode::InternalError,
            message: other.to_string().into(),
            data: None,
        },
    })
}

fn note_result(note: &NewNote) -> Result<serde_json::Value> {
    let uri = path_to_uri(&note.path).ok_or_else(|| Error {
        code: ErrorCode::InternalError,
        message: format!("Not a file path: {:?}", note.path).into(),
        data: None,
    })?;
    serde_json::to_value(NewNoteResult {
        uri,
        created: note.created,
    })
    .map_err(|e| Error {
        code: ErrorCode::InternalError,
        message: e.to_string().into(),
        data: None,
    })
}
