use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::lsp_types::Url;
use wikilinks_core::{FileSystem, Workspace};

use crate::config::LspSettings;

/// Global state for LSP server
/// Must be Send + Sync
#[derive(Clone)]
pub struct GlobalState {
    /// Set once `initialize` saw a usable root.
    /// The workspace itself is `Sync`, so requests only hold the lock long
    /// enough to clone the `Arc`.
    pub workspace: Arc<RwLock<Option<Arc<Workspace>>>>,

    /// Effective settings; handlers take a snapshot per request
    pub config: Arc<RwLock<LspSettings>>,

    /// Text of open documents, kept in sync with didOpen/didChange
    pub document_cache: Arc<RwLock<HashMap<Url, String>>>,

    /// Edit counter per document, used to debounce live suggest
    pub edit_generations: Arc<RwLock<HashMap<Url, u64>>>,

    pub fs: Arc<dyn FileSystem>,
}

impl GlobalState {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            workspace: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(LspSettings::default())),
            document_cache: Arc::new(RwLock::new(HashMap::new())),
            edit_generations: Arc::new(RwLock::new(HashMap::new())),
            fs,
        }
    }

    pub async fn workspace(&self) -> Option<Arc<Workspace>> {
        self.workspace.read().await.clone()
    }

    pub async fn settings(&self) -> LspSettings {
        self.config.read().await.clone()
    }

    /// Open buffer text, falling back to the file on disk.
    pub async fn document_text(&self, uri: &Url) -> Option<String> {
        if let Some(text) = self.document_cache.read().await.get(uri) {
            return Some(text.clone());
        }
        let path = uri.to_file_path().ok()?;
        match self.fs.read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("Cannot read {}: {}", uri, e);
                None
            }
        }
    }

    pub async fn invalidate(&self) {
        if let Some(ws) = self.workspace().await {
            ws.invalidate();
        }
    }
}
