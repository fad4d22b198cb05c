//! Link text → document resolution.
//!
//! One entry point serves both naming conventions so definition, reference
//! search and note creation agree on what a link points at.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::NamingConvention;
use crate::utils::paths::{clean_path, relative_path, to_slash};
use crate::utils::{basename_matches, normalize_note_name};
use crate::vfs::FileSystem;

/// `name (dir)`, the label form of a note in another directory.
///
/// Titles that themselves end in parentheses are misread as this form.
static RX_NAME_WITH_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s*\((.+?)\)$").unwrap());

pub struct DocumentMatcher<'a> {
    pub root: &'a Path,
    pub fs: &'a dyn FileSystem,
    pub convention: NamingConvention,
}

impl<'a> DocumentMatcher<'a> {
    pub fn new(root: &'a Path, fs: &'a dyn FileSystem, convention: NamingConvention) -> Self {
        Self {
            root,
            fs,
            convention,
        }
    }

    /// Every document `raw` refers to when written inside `from_document`.
    ///
    /// Several results mean the name is ambiguous; they are all returned.
    pub fn match_documents(
        &self,
        raw: &str,
        from_document: Option<&Path>,
        notes: &[PathBuf],
    ) -> Vec<PathBuf> {
        if raw.trim().is_empty() {
            return Vec::new();
        }

        let mut found = match self.convention {
            NamingConvention::UniqueBasename => notes
                .iter()
                .filter(|note| basename_matches(note, raw))
                .cloned()
                .collect(),
            NamingConvention::RelativePath => self.match_relative(raw, from_document, notes),
        };

        if found.is_empty() {
            if let Some(path) = self.literal_path(raw, from_document) {
                found.push(path);
            }
        }
        found
    }

    fn match_relative(
        &self,
        raw: &str,
        from_document: Option<&Path>,
        notes: &[PathBuf],
    ) -> Vec<PathBuf> {
        let wanted = wanted_keys(raw);

        if let Some(from_dir) = from_document.and_then(Path::parent) {
            let found = lookup_keys(&key_map(from_dir, notes), &wanted);
            if !found.is_empty() {
                return found;
            }
        }

        lookup_keys(&key_map(self.root, notes), &wanted)
    }

    /// `raw` taken as a file path next to the requesting document.
    fn literal_path(&self, raw: &str, from_document: Option<&Path>) -> Option<PathBuf> {
        let from_dir = from_document?.parent()?;
        let candidate = clean_path(&from_dir.join(raw.trim()));
        if self.fs.is_file(&candidate) {
            log::debug!("Link {:?} resolved as literal path {:?}", raw, candidate);
            Some(candidate)
        } else {
            None
        }
    }
}

/// Notes keyed by their normalized path relative to one directory.
type KeyMap = HashMap<String, Vec<PathBuf>>;

fn key_map(base: &Path, notes: &[PathBuf]) -> KeyMap {
    let mut map = KeyMap::new();
    for note in notes {
        let key = normalize_note_name(&to_slash(&relative_path(base, note)));
        map.entry(key).or_default().push(note.clone());
    }
    map
}

/// Keys `raw` may stand for: the text itself and, for `name (dir)`, `dir/name`.
fn wanted_keys(raw: &str) -> Vec<String> {
    let mut keys = vec![normalize_note_name(raw)];
    if let Some((name, dir)) = split_name_with_dir(raw) {
        keys.push(normalize_note_name(&format!(
            "{}/{}",
            dir.trim_end_matches('/'),
            name
        )));
    }
    keys
}

fn lookup_keys(map: &KeyMap, wanted: &[String]) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = wanted
        .iter()
        .filter_map(|key| map.get(key))
        .flatten()
        .cloned()
        .collect();
    found.sort();
    found.dedup();
    found
}

/// Resolves many links against one note list.
///
/// Key maps are built once per directory and results are remembered per
/// directory and link text, so a workspace-wide scan does not repeat the
/// matching (or the literal path probe) for every occurrence.
pub struct LinkResolver<'a, 'm> {
    matcher: &'m DocumentMatcher<'a>,
    notes: &'m [PathBuf],
    key_maps: HashMap<PathBuf, KeyMap>,
    resolved: HashMap<(PathBuf, String), Vec<PathBuf>>,
}

impl<'a, 'm> LinkResolver<'a, 'm> {
    pub fn new(matcher: &'m DocumentMatcher<'a>, notes: &'m [PathBuf]) -> Self {
        Self {
            matcher,
            notes,
            key_maps: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// Same answer as [`DocumentMatcher::match_documents`] for `raw` written
    /// inside `from_document`.
    pub fn resolve(&mut self, raw: &str, from_document: &Path) -> &[PathBuf] {
        let from_dir = from_document
            .parent()
            .unwrap_or(self.matcher.root)
            .to_path_buf();
        let memo_key = (from_dir, raw.trim().to_string());
        if !self.resolved.contains_key(&memo_key) {
            let found = self.lookup(raw, from_document);
            self.resolved.insert(memo_key.clone(), found);
        }
        &self.resolved[&memo_key]
    }

    fn lookup(&mut self, raw: &str, from_document: &Path) -> Vec<PathBuf> {
        if raw.trim().is_empty() {
            return Vec::new();
        }
        if self.matcher.convention == NamingConvention::UniqueBasename {
            return self
                .matcher
                .match_documents(raw, Some(from_document), self.notes);
        }

        let wanted = wanted_keys(raw);
        if let Some(from_dir) = from_document.parent() {
            let found = lookup_keys(self.key_map(from_dir), &wanted);
            if !found.is_empty() {
                return found;
            }
        }
        let root = self.matcher.root;
        let found = lookup_keys(self.key_map(root), &wanted);
        if !found.is_empty() {
            return found;
        }

        self.matcher
            .literal_path(raw, Some(from_document))
            .into_iter()
            .collect()
    }

    fn key_map(&mut self, base: &Path) -> &KeyMap {
        let notes = self.notes;
        self.key_maps
            .entry(base.to_path_buf())
            .or_insert_with(|| key_map(base, notes))
    }
}

/// Split `name (dir)` into `(name, dir)`.
pub fn split_name_with_dir(raw: &str) -> Option<(&str, &str)> {
    let captures = RX_NAME_WITH_DIR.captures(raw.trim())?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}
