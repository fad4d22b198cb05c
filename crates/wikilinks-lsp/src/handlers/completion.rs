use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use wikilinks_core::model::CandidateDocument;

use super::{run_blocking, RequestContext};
use crate::conversion::{lsp_position_to_point, text_range_to_lsp_range};
use crate::protocol::CompletionData;
use crate::state::GlobalState;

const SCORE_SCALE: f64 = 999_999.0;

/// Handle "textDocument/completion" request
pub async fn handle_completion(
    _client: &Client,
    state: &GlobalState,
    params: CompletionParams,
) -> Result<Option<CompletionResponse>> {
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

    let completion = run_blocking(move |cancel| {
        workspace.completions_for(&path, &text, point, &settings.wiki_links, cancel)
    })
    .await?;

    let Some(replace_range) = completion.link.replace_range else {
        return Ok(None);
    };

    let range = text_range_to_lsp_range(replace_range);
    let items = completion
        .candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| completion_item(candidate, index, range))
        .collect();

    // ranking depends on the whole query, so the client has to ask again
    Ok(Some(CompletionResponse::List(CompletionList {
        is_incomplete: true,
        items,
    })))
}

fn completion_item(candidate: CandidateDocument, index: usize, range: Range) -> CompletionItem {
    CompletionItem {
        label: candidate.label.clone(),
        kind: Some(CompletionItemKind::FILE),
        filter_text: Some(candidate.filter_text),
        sort_text: Some(sort_text(candidate.score, index)),
        preselect: (index == 0).then_some(true),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit {
            range,
            new_text: candidate.label,
        })),
        commit_characters: Some(vec!["]".to_string()]),
        data: serde_json::to_value(CompletionData {
            path: candidate.path,
        })
        .ok(),
        ..Default::default()
    }
}

/// Score first, then rank, both zero-padded so string order is numeric order.
fn sort_text(score: f64, index: usize) -> String {
    let scaled = (score.clamp(0.0, 1.0) * SCORE_SCALE).round() as u64;
    format!("{:06}_{:04}", scaled, index.min(9999))
}

/// Handle "completionItem/resolve" request: add the note title as detail.
pub async fn handle_completion_resolve(
    state: &GlobalState,
    mut item: CompletionItem,
) -> Result<CompletionItem> {
    let Some(data) = item.data.clone() else {
        return Ok(item);
    };
    let data: CompletionData = match serde_json::from_value(data) {
        Ok(data) => data,
        Err(e) => {
            log::debug!("Unexpected completion data: {}", e);
            return Ok(item);
        }
    };
    let Some(workspace) = state.workspace().await else {
        return Ok(item);
    };

    let detail = run_blocking(move |_| workspace.resolve_detail(&data.path)).await?;
    if detail.is_some() {
        item.detail = detail;
    }
    Ok(item)
}
