mod commands;
mod completion;
mod configuration;
mod lifecycle;
mod navigation;
mod notifications;

pub use commands::*;
pub use completion::*;
pub use configuration::*;
pub use lifecycle::*;
pub use navigation::*;
pub use notifications::*;
pub(crate) use notifications::still_in_link;

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_lsp::jsonrpc::{Error, ErrorCode, Result};
use tower_lsp::lsp_types::Url;
use wikilinks_core::Workspace;

use crate::config::LspSettings;
use crate::state::GlobalState;

/// Everything a position request needs, captured before going blocking.
pub(crate) struct RequestContext {
    pub workspace: Arc<Workspace>,
    pub settings: LspSettings,
    pub path: PathBuf,
    pub text: String,
}

impl RequestContext {
    pub async fn load(state: &GlobalState, uri: &Url) -> Option<Self> {
        let workspace = state.workspace().await?;
        let path = uri.to_file_path().ok()?;
        let text = state.document_text(uri).await?;
        Some(Self {
            workspace,
            settings: state.settings().await,
            path,
            text,
        })
    }
}

/// Run synchronous core work off the async runtime.
///
/// The token is cancelled when the calling future is dropped, so a request
/// the client abandons stops its blocking work at the next check.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce(&CancellationToken) -> T + Send + 'static,
    T: Send + 'static,
{
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    tokio::task::spawn_blocking(move || work(&cancel))
        .await
        .map_err(|e| Error {
            code: ErrorCode::InternalError,
            message: format!("Background task failed: {}", e).into(),
            data: None,
        })
}
