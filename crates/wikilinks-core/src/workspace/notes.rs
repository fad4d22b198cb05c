use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::config::WikiLinksConfig;
use crate::error::NoteError;
use crate::model::NamingConvention;
use crate::utils::template::{render, timestamp};
use crate::utils::{note_file_name_from_title, slugify_title, strip_extension};

use super::Workspace;

/// Outcome of a new-note command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub path: PathBuf,
    /// `false` when the note already existed and was left untouched
    pub created: bool,
    /// Text that replaces a selection the note was created from
    pub link_text: String,
}

impl Workspace {
    /// Create the note a dangling link points to.
    ///
    /// Writes `# <title>` and a blank line into `<slug>.md` next to
    /// `document` unless that file already exists. Returns the path either
    /// way; `None` when creation is switched off.
    pub fn create_missing_note(
        &self,
        raw: &str,
        document: &Path,
        config: &WikiLinksConfig,
        cancel: &CancellationToken,
    ) -> Result<Option<PathBuf>, NoteError> {
        if !config.create_missing_on_goto_definition {
            return Ok(None);
        }
        if config.naming_convention != NamingConvention::UniqueBasename {
            log::warn!("Not creating {:?}: relative-path convention is active", raw);
            return Err(NoteError::RequiresUniqueBasename);
        }

        let title = strip_extension(raw.trim());
        if slugify_title(title, true).is_empty() {
            return Err(NoteError::EmptyTitle(raw.to_string()));
        }
        let Some(dir) = document.parent() else {
            return Ok(None);
        };

        let path = dir.join(note_file_name_from_title(title));
        let content = format!("# {}\n\n", title);
        self.write_if_absent(&path, &content, cancel)?;
        Ok(Some(path))
    }

    /// Create a note titled `title` following the `newNote` settings.
    pub fn new_note(
        &self,
        title: &str,
        active_document: Option<&Path>,
        config: &WikiLinksConfig,
        cancel: &CancellationToken,
    ) -> Result<NewNote, NoteError> {
        let title = title.trim();
        let settings = &config.new_note;
        let now = timestamp(&settings.timestamp_format);

        let stem = slugify_title(
            &render(&settings.filename_template, title, &now),
            settings.lowercase_filename,
        );
        if title.is_empty() || stem.is_empty() {
            return Err(NoteError::EmptyTitle(title.to_string()));
        }

        let dir = settings.directory.resolve(&self.root, active_document);
        let path = dir.join(format!("{}.md", stem));
        let content = render(&settings.content_template, title, &now);
        let created = self.write_if_absent(&path, &content, cancel)?;

        Ok(NewNote {
            path,
            created,
            link_text: render(&settings.selection_replacement_template, title, &now),
        })
    }

    fn write_if_absent(
        &self,
        path: &Path,
        content: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, NoteError> {
        if self.fs.is_file(path) {
            log::debug!("Note {:?} already exists", path);
            return Ok(false);
        }
        if cancel.is_cancelled() {
            return Err(NoteError::Cancelled);
        }

        self.fs
            .create_file(path, content)
            .map_err(|source| NoteError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Created note {:?}", path);
        self.invalidate();
        Ok(true)
    }
}
