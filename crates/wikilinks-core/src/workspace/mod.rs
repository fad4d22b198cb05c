use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cache::NoteIndex;
use crate::config::WikiLinksConfig;
use crate::discovery::list_notes;
use crate::vfs::FileSystem;

mod notes;
mod queries;

pub use notes::NewNote;


/// The Workspace acts as the high-level Facade for the wiki-link core.
///
/// # Architecture Decision: Snapshot configuration
///
/// The workspace owns nothing but the root, the file system and the note
/// index cache. Every operation receives the caller's current
/// [`WikiLinksConfig`], so a settings change takes effect on the next request
/// without any reload step.
///
/// All methods take `&self`; the type is `Send + Sync` and meant to be shared
/// behind an `Arc` across concurrent requests.
pub struct Workspace {
    pub(crate) root: PathBuf,
    pub(crate) fs: Arc<dyn FileSystem>,
    pub(crate) index: NoteIndex,
}

impl Workspace {
    pub fn new(root: PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root,
            fs,
            index: NoteIndex::new(),
        }
    }

    /// Drop the cached note list; the next request enumerates again.
    pub fn invalidate(&self) {
        log::debug!("Note index invalidated");
        self.index.invalidate();
    }

    /// Known notes, from the cache when enabled and fresh.
    pub fn notes(&self, config: &WikiLinksConfig, cancel: &CancellationToken) -> Arc<Vec<PathBuf>> {
        self.index.get_or_refill(config.index.cache_enabled, || {
            list_notes(&self.root, &*self.fs, &config.index, cancel)
        })
    }
}
