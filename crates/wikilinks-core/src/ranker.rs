//! Completion candidates for a (possibly empty) link query.

use std::path::{Path, PathBuf};

use fst::automaton::{Levenshtein, StartsWith};
use fst::Automaton;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::model::{CandidateDocument, NamingConvention};
use crate::utils::paths::{relative_path, to_slash};
use crate::utils::{normalize_note_name, strip_extension};

/// Display name, file name, workspace path
const FIELD_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];

/// Dissimilarity of a field that only matched within the typo tolerance.
const TYPO_SCORE: f64 = 0.6;

/// Dissimilarity of a field that did not match.
const NO_MATCH: f64 = 1.0;

/// Shorter queries get no typo tolerance; an edit would match almost anything.
const ONE_EDIT_FROM: usize = 3;

/// Queries this long (in chars) tolerate two edits instead of one.
const TWO_EDITS_FROM: usize = 5;

pub struct Ranker<'a> {
    pub root: &'a Path,
    pub convention: NamingConvention,
    /// The document being edited; display names are relative to it under
    /// [`NamingConvention::RelativePath`].
    pub from_document: Option<&'a Path>,
}

struct Fields {
    label: String,
    keys: Vec<String>,
}

impl<'a> Ranker<'a> {
    pub fn new(root: &'a Path, convention: NamingConvention, from_document: Option<&'a Path>) -> Self {
        Self {
            root,
            convention,
            from_document,
        }
    }

    /// Name shown and inserted for `note`.
    pub fn display_name(&self, note: &Path) -> String {
        match self.convention {
            NamingConvention::UniqueBasename => file_stem_of(note),
            NamingConvention::RelativePath => {
                let base = self
                    .from_document
                    .and_then(Path::parent)
                    .unwrap_or(self.root);
                strip_extension(&to_slash(&relative_path(base, note))).to_string()
            }
        }
    }

    fn fields(&self, note: &Path) -> Fields {
        let label = self.display_name(note);
        let file_name = file_stem_of(note);
        let workspace_path = to_slash(note.strip_prefix(self.root).unwrap_or(note));
        let keys = vec![
            normalize_note_name(&label),
            normalize_note_name(&file_name),
            normalize_note_name(&workspace_path),
        ];
        Fields { label, keys }
    }

    /// Ranked candidates for `query`, best first.
    pub fn rank(&self, query: &str, notes: &[PathBuf]) -> Vec<CandidateDocument> {
        let normalized_query = normalize_note_name(query);
        if normalized_query.is_empty() {
            return self.list_all(query, notes);
        }

        let scorer = FieldScorer::new(&normalized_query);
        let mut candidates: Vec<CandidateDocument> = notes
            .iter()
            .filter_map(|note| {
                let fields = self.fields(note);
                let scores: Vec<Option<f64>> =
                    fields.keys.iter().map(|key| scorer.score(key)).collect();
                if scores.iter().all(Option::is_none) {
                    return None;
                }
                let score = weighted_score(&scores);
                Some(candidate(note, query, fields, score))
            })
            .collect();

        // stable: equal scores keep enumeration order
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
        log::debug!("{} candidates for {:?}", candidates.len(), query);
        candidates
    }

    fn list_all(&self, query: &str, notes: &[PathBuf]) -> Vec<CandidateDocument> {
        let mut candidates: Vec<CandidateDocument> = notes
            .iter()
            .map(|note| candidate(note, query, self.fields(note), 0.0))
            .collect();
        candidates.sort_by_cached_key(|c| c.label.to_lowercase());
        candidates
    }
}

fn candidate(note: &Path, query: &str, fields: Fields, score: f64) -> CandidateDocument {
    CandidateDocument {
        path: note.to_path_buf(),
        filter_text: format!("{} {}", query, fields.label),
        label: fields.label,
        normalized_keys: fields.keys,
        score,
    }
}

fn file_stem_of(note: &Path) -> String {
    note.file_name()
        .map(|name| strip_extension(&name.to_string_lossy()).to_string())
        .unwrap_or_default()
}

fn weighted_score(scores: &[Option<f64>]) -> f64 {
    let total_weight: f64 = FIELD_WEIGHTS.iter().sum();
    scores
        .iter()
        .zip(FIELD_WEIGHTS.iter())
        .map(|(score, weight)| score.unwrap_or(NO_MATCH) * weight)
        .sum::<f64>()
        / total_weight
}

/// Per-field dissimilarity in `[0, 1]`, `None` when the field is out of reach.
struct FieldScorer<'q> {
    query: &'q str,
    query_chars: usize,
    matcher: SkimMatcherV2,
    best_score: i64,
    typos: Option<StartsWith<Levenshtein>>,
}

impl<'q> FieldScorer<'q> {
    fn new(query: &'q str) -> Self {
        let matcher = SkimMatcherV2::default();
        let best_score = matcher.fuzzy_match(query, query).unwrap_or(1).max(1);
        let query_chars = query.chars().count();
        let typos = if query_chars < ONE_EDIT_FROM {
            None
        } else {
            let distance = if query_chars >= TWO_EDITS_FROM { 2 } else { 1 };
            match Levenshtein::new(query, distance) {
                Ok(automaton) => Some(automaton.starts_with()),
                Err(e) => {
                    log::debug!("No typo tolerance for {:?}: {}", query, e);
                    None
                }
            }
        };
        Self {
            query,
            query_chars,
            matcher,
            best_score,
            typos,
        }
    }

    fn score(&self, key: &str) -> Option<f64> {
        if key == self.query {
            return Some(0.0);
        }

        if let Some(score) = self.matcher.fuzzy_match(key, self.query) {
            let closeness = (score as f64 / self.best_score as f64).clamp(0.0, 1.0);
            let coverage = self.query_chars as f64 / key.chars().count().max(1) as f64;
            return Some(0.4 * (1.0 - closeness) + 0.1 * (1.0 - coverage.min(1.0)));
        }

        match &self.typos {
            Some(automaton) if accepts(automaton, key) => Some(TYPO_SCORE),
            _ => None,
        }
    }
}

fn accepts<A: Automaton>(automaton: &A, key: &str) -> bool {
    let mut state = automaton.start();
    if automaton.is_match(&state) {
        return true;
    }
    for byte in key.bytes() {
        if !automaton.can_match(&state) {
            return false;
        }
        state = automaton.accept(&state, byte);
        if automaton.is_match(&state) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(root: &Path, names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| root.join(n)).collect()
    }

    fn labels(candidates: &[CandidateDocument]) -> Vec<&str> {
        candidates.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_empty_query_lists_all_alphabetically() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("", &notes(root, &["Banana.md", "apple.md", "Cherry.md"]));
        assert_eq!(labels(&result), vec!["apple", "Banana", "Cherry"]);
        assert!(result.iter().all(|c| c.score == 0.0));
    }

    #[test]
    fn test_empty_query_example_order() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("", &notes(root, &["Banana.md", "Apple.md"]));
        assert_eq!(labels(&result), vec!["Apple", "Banana"]);
    }

    #[test]
    fn test_dropped_character_still_matches() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("aple", &notes(root, &["apple.md", "zebra.md"]));
        assert_eq!(labels(&result), vec!["apple"]);
    }

    #[test]
    fn test_transposition_is_tolerated() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("rpoject", &notes(root, &["project.md", "other.md"]));
        assert_eq!(labels(&result), vec!["project"]);
        assert!(result[0].score > 0.0);
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank(
            "plan",
            &notes(root, &["planet-notes.md", "my-plans.md", "plan.md"]),
        );
        assert_eq!(result[0].label, "plan");
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_match_is_location_agnostic() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("notes", &notes(root, &["meeting-notes.md"]));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_path_field_matches_directories() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("journal", &notes(root, &["journal/2024-01-01.md", "misc.md"]));
        assert_eq!(labels(&result), vec!["2024-01-01"]);
        // only the path field matched, so it scores worse than a name hit
        assert!(result[0].score > 0.5);
    }

    #[test]
    fn test_short_query_has_no_typo_tolerance() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("q", &notes(root, &["alpha.md", "quote.md"]));
        assert_eq!(labels(&result), vec!["quote"]);
    }

    #[test]
    fn test_non_latin_query() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("日本", &notes(root, &["日本語ノート.md", "english.md"]));
        assert_eq!(labels(&result), vec!["日本語ノート"]);
    }

    #[test]
    fn test_filter_text_and_keys() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank("Proj", &notes(root, &["work/Project Plan.md"]));
        assert_eq!(result[0].filter_text, "Proj Project Plan");
        assert_eq!(
            result[0].normalized_keys,
            vec!["projectplan", "projectplan", "work/projectplan"]
        );
    }

    #[test]
    fn test_relative_display_names() {
        let root = Path::new("/ws");
        let from = root.join("a/x.md");
        let ranker = Ranker::new(root, NamingConvention::RelativePath, Some(&from));
        let result = ranker.rank("", &notes(root, &["a/sub/note.md", "b/other.md"]));
        assert_eq!(labels(&result), vec!["../b/other", "sub/note"]);
    }

    #[test]
    fn test_separator_only_query_lists_everything() {
        let root = Path::new("/ws");
        let ranker = Ranker::new(root, NamingConvention::UniqueBasename, None);
        let result = ranker.rank(" - ", &notes(root, &["b.md", "a.md"]));
        assert_eq!(labels(&result), vec!["a", "b"]);
    }
}
