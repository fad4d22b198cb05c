use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use wikilinks_core::NoteError;

use super::{run_blocking, RequestContext};
use crate::conversion::{lsp_position_to_point, path_to_uri, text_range_to_lsp_range};
use crate::state::GlobalState;

/// Handle "textDocument/definition" request
///
/// Every matching note is returned so the editor can offer a choice when the
/// link is ambiguous. A missing note may be created on the way.
pub async fn handle_goto_definition(
    client: &Client,
    state: &GlobalState,
    params: GotoDefinitionParams,
) -> Result<Option<GotoDefinitionResponse>> {
    let uri = &params.text_document_position_params.text_document.uri;
    let point = lsp_position_to_point(params.text_document_position_params.position);

    let Some(RequestContext {
        workspace,
        settings,
        path,
        text,
    }) = RequestContext::load(state, uri).await
    else {
        return Ok(None);
    };

    let result = run_blocking(move |cancel| {
        workspace.definitions_for(&path, &text, point, &settings.wiki_links, cancel)
    })
    .await?;

    let targets = match result {
        Ok(targets) => targets,
        Err(e @ NoteError::RequiresUniqueBasename) => {
            client.show_message(MessageType::WARNING, e.to_string()).await;
            return Ok(None);
        }
        Err(NoteError::Cancelled) => return Ok(None),
        Err(e) => {
            log::warn!("Go to definition failed: {}", e);
            client
                .log_message(MessageType::WARNING, format!("Go to definition failed: {}", e))
                .await;
            return Ok(None);
        }
    };

    let locations: Vec<Location> = targets
        .iter()
        .filter_map(|target| path_to_uri(target))
        .map(|uri| Location {
            uri,
            range: Range::default(),
        })
        .collect();

    if locations.is_empty() {
        return Ok(None);
    }
    Ok(Some(GotoDefinitionResponse::Array(locations)))
}

/// Handle "textDocument/references" request
pub async fn handle_references(
    state: &GlobalState,
    params: ReferenceParams,
) -> Result<Option<Vec<Location>>> {
    let uri = &params.text_document_position.text_document.uri;
    let point = lsp_position_to_point(params.text_document_position.position);

    let Some(RequestContext {
        workspace,
        settings,
        path,
        text,
    }) = RequestContext::load(state, uri).await
    else {
        return Ok(None);
    };

    let references = run_blocking(move |cancel| {
        workspace.references_for(&path, &text, point, &settings.wiki_links, cancel)
    })
    .await?;

    let locations: Vec<Location> = references
        .into_iter()
        .filter_map(|(path, range)| {
            Some(Location {
                uri: path_to_uri(&path)?,
                range: text_range_to_lsp_range(range),
            })
        })
        .collect();

    if locations.is_empty() {
        return Ok(None);
    }
    Ok(Some(locations))
}
