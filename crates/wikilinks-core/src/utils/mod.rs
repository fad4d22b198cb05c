pub mod paths;
pub mod template;

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// File extensions that make a file a note.
pub const NOTE_EXTENSIONS: &[&str] = &["md", "markdown", "mdx", "fountain", "txt"];

static RX_NOTE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(md|markdown|mdx|fountain|txt)$").unwrap());

static RX_NAME_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-_.]+").unwrap());

/// Remove one trailing note extension, case-insensitively.
///
/// ```
/// use wikilinks_core::strip_extension;
///
/// assert_eq!(strip_extension("Note.MD"), "Note");
/// assert_eq!(strip_extension("script.fountain"), "script");
/// assert_eq!(strip_extension("archive.tar"), "archive.tar");
/// ```
pub fn strip_extension(name: &str) -> &str {
    match RX_NOTE_EXTENSION.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Canonical form used for every "same note name" comparison.
///
/// Rules:
/// - Strip a known note extension
/// - Lower-case
/// - Drop runs of whitespace, hyphens, underscores and dots
/// - Keep everything else, including non-Latin letters and `/`
///
/// # Examples
///
/// ```
/// use wikilinks_core::normalize_note_name;
///
/// assert_eq!(normalize_note_name("My Cool-Note.md"), "mycoolnote");
/// assert_eq!(normalize_note_name("my_cool.note"), "mycoolnote");
/// assert_eq!(normalize_note_name("日本語 ノート"), "日本語ノート");
/// assert_eq!(normalize_note_name("sub/Page Two.markdown"), "sub/pagetwo");
/// ```
pub fn normalize_note_name(name: &str) -> String {
    let lowered = strip_extension(name).to_lowercase();
    RX_NAME_SEPARATORS.replace_all(&lowered, "").into_owned()
}

/// Whether two link texts name the same note.
pub fn names_match(left: &str, right: &str) -> bool {
    normalize_note_name(left) == normalize_note_name(right)
}

/// Whether the basename of `path` names the same note as `raw`.
pub fn basename_matches(path: &Path, raw: &str) -> bool {
    let Some(basename) = path.file_name() else {
        return false;
    };
    normalize_note_name(&basename.to_string_lossy()) == normalize_note_name(raw)
}

/// Slugify a note title into a file stem.
///
/// Runs of anything that is not a letter or digit (Unicode-aware) become a
/// single hyphen; leading and trailing hyphens are trimmed.
///
/// # Examples
///
/// ```
/// use wikilinks_core::slugify_title;
///
/// assert_eq!(slugify_title("My Cool Note", true), "my-cool-note");
/// assert_eq!(slugify_title("Hello (World)!", true), "hello-world");
/// assert_eq!(slugify_title("A  --  B", false), "A-B");
/// assert_eq!(slugify_title("你好 World", true), "你好-world");
/// assert_eq!(slugify_title("!!!", true), "");
/// ```
pub fn slugify_title(title: &str, lowercase: bool) -> String {
    let source = if lowercase {
        title.to_lowercase()
    } else {
        title.to_string()
    };

    let mut slug = String::with_capacity(source.len());
    let mut pending_hyphen = false;
    for c in source.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// File name for a note created from `title`: lower-case slug plus `.md`.
pub fn note_file_name_from_title(title: &str) -> String {
    format!("{}.md", slugify_title(title, true))
}

/// Whether `path` carries one of the note extensions.
pub fn is_note_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            NOTE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Note.md",
            "a.md.md",
            "  Mixed_Case - Name.TXT ",
            "日本語-ノート.mdx",
            "dir/sub.dir/File Name.markdown",
            "...",
            "",
            "Ünïcödé Straße",
        ];
        for sample in samples {
            let once = normalize_note_name(sample);
            assert_eq!(normalize_note_name(&once), once, "input: {sample:?}");
        }
    }

    #[test]
    fn test_normalize_strips_only_known_extensions() {
        assert_eq!(normalize_note_name("report.pdf"), "reportpdf");
        assert_eq!(normalize_note_name("Report.TXT"), "report");
        assert_eq!(normalize_note_name("notes.md.bak"), "notesmdbak");
    }

    #[test]
    fn test_names_match_across_separators_and_case() {
        assert!(names_match("My Note", "my-note.md"));
        assert!(names_match("my_note", "MY.NOTE"));
        assert!(!names_match("my note", "my notes"));
    }

    #[test]
    fn test_basename_matches_ignores_directories() {
        let path = PathBuf::from("/vault/deep/dir/Project Plan.md");
        assert!(basename_matches(&path, "project-plan"));
        assert!(!basename_matches(&path, "dir/project-plan"));
    }

    #[test]
    fn test_slug_round_trips_through_normalizer() {
        let titles = ["My Cool Note", "daily 2024-01-01", "中文 标题", "Alpha-Beta gamma"];
        for title in titles {
            let file = note_file_name_from_title(title);
            assert_eq!(
                normalize_note_name(strip_extension(&file)),
                normalize_note_name(title),
                "title: {title:?}"
            );
        }
    }

    #[test]
    fn test_note_file_name_from_title() {
        assert_eq!(note_file_name_from_title("Meeting Notes"), "meeting-notes.md");
        assert_eq!(note_file_name_from_title("  --Trim me--  "), "trim-me.md");
    }

    #[test]
    fn test_is_note_path() {
        assert!(is_note_path(Path::new("a/b.md")));
        assert!(is_note_path(Path::new("a/b.Fountain")));
        assert!(!is_note_path(Path::new("a/b.rs")));
        assert!(!is_note_path(Path::new("a/md")));
    }
}
