use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::config::WikiLinksConfig;
use crate::error::NoteError;
use crate::matcher::{DocumentMatcher, LinkResolver};
use crate::model::{Completion, LinkReference, NamingConvention, Point, TextRange};
use crate::parser::{link_at_point, link_or_open_at_point, scan_links};
use crate::ranker::Ranker;
use crate::utils::names_match;

use super::Workspace;

const HEADING_MARKER: &str = "# ";

impl Workspace {
    pub(crate) fn matcher(&self, config: &WikiLinksConfig) -> DocumentMatcher<'_> {
        DocumentMatcher::new(&self.root, &*self.fs, config.naming_convention)
    }

    /// The link token under `position`, or a `Null` reference
    pub fn resolve_link_at(&self, text: &str, position: Point) -> LinkReference {
        link_at_point(text, position)
    }

    /// Ranked notes to complete the link being edited at `position`
    pub fn completions_for(
        &self,
        document: &Path,
        text: &str,
        position: Point,
        config: &WikiLinksConfig,
        cancel: &CancellationToken,
    ) -> Completion {
        let link = link_or_open_at_point(text, position);
        if !link.is_wiki_link() {
            return Completion::empty();
        }

        let notes = self.notes(config, cancel);
        if cancel.is_cancelled() {
            return Completion::empty();
        }

        let ranker = Ranker::new(&self.root, config.naming_convention, Some(document));
        let candidates = ranker.rank(&link.raw_text, &notes);
        Completion { link, candidates }
    }

    /// First level-1 heading of a note, for completion details.
    ///
    /// Best effort: unreadable files and notes without a heading give `None`.
    pub fn resolve_detail(&self, path: &Path) -> Option<String> {
        let content = match self.fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("No detail for {:?}: {}", path, e);
                return None;
            }
        };

        content
            .lines()
            .find(|line| line.starts_with(HEADING_MARKER))
            .map(|line| line[HEADING_MARKER.len()..].trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Documents the link at `position` points to.
    ///
    /// With nothing found and `create_missing_on_goto_definition` set, the
    /// target note is created next to `document` and returned.
    pub fn definitions_for(
        &self,
        document: &Path,
        text: &str,
        position: Point,
        config: &WikiLinksConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<PathBuf>, NoteError> {
        let link = link_at_point(text, position);
        if !link.is_wiki_link() || link.raw_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let notes = self.notes(config, cancel);
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        let found = self
            .matcher(config)
            .match_documents(&link.raw_text, Some(document), &notes);
        if !found.is_empty() {
            if found.len() > 1 {
                log::debug!("{:?} is ambiguous: {} matches", link.raw_text, found.len());
            }
            return Ok(found);
        }

        let created = self.create_missing_note(&link.raw_text, document, config, cancel)?;
        Ok(created.into_iter().collect())
    }

    /// Every link in the workspace naming the same note as the link at
    /// `position`. Ranges cover the whole token, brackets included.
    pub fn references_for(
        &self,
        document: &Path,
        text: &str,
        position: Point,
        config: &WikiLinksConfig,
        cancel: &CancellationToken,
    ) -> Vec<(PathBuf, TextRange)> {
        let link = link_at_point(text, position);
        if !link.is_wiki_link() || link.raw_text.trim().is_empty() {
            return Vec::new();
        }

        let notes = self.notes(config, cancel);
        let matcher = self.matcher(config);

        // The same relative path reads differently from another directory, so
        // under RelativePath links are also compared by what they resolve to.
        let targets = match config.naming_convention {
            NamingConvention::RelativePath => {
                matcher.match_documents(&link.raw_text, Some(document), &notes)
            }
            NamingConvention::UniqueBasename => Vec::new(),
        };

        let mut resolver = LinkResolver::new(&matcher, notes.as_slice());
        let mut locations = Vec::new();
        for note in notes.iter() {
            if cancel.is_cancelled() {
                return Vec::new();
            }

            let content = match self.fs.read_to_string(note) {
                Ok(content) => content,
                Err(e) => {
                    log::debug!("Skipping {:?} in reference search: {}", note, e);
                    continue;
                }
            };

            for occurrence in scan_links(&content) {
                let same_note = names_match(&occurrence.text, &link.raw_text)
                    || (!targets.is_empty()
                        && resolver
                            .resolve(&occurrence.text, note)
                            .iter()
                            .any(|target| targets.contains(target)));
                if same_note {
                    locations.push((note.clone(), occurrence.range));
                }
            }
        }
        locations
    }
}
