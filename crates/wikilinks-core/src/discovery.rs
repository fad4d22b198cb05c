//! Note enumeration: extension allow-list, exclude globs and `.gitignore`.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio_util::sync::CancellationToken;

use crate::config::IndexConfig;
use crate::utils::paths::to_slash;
use crate::utils::NOTE_EXTENSIONS;
use crate::vfs::FileSystem;

/// Paths handed to one `git check-ignore` invocation.
const GIT_CHUNK_SIZE: usize = 200;

/// All notes under `root`, sorted by path.
///
/// Returns `None` when cancelled so callers never cache a partial list.
pub fn list_notes(
    root: &Path,
    fs: &dyn FileSystem,
    config: &IndexConfig,
    cancel: &CancellationToken,
) -> Option<Vec<PathBuf>> {
    if cancel.is_cancelled() {
        return None;
    }

    let mut notes = fs.list_files(root, NOTE_EXTENSIONS);
    log::debug!("Found {} note files under {:?}", notes.len(), root);

    if cancel.is_cancelled() {
        return None;
    }

    let excludes = build_excludes(&config.exclude);
    notes.retain(|path| {
        let relative = path.strip_prefix(root).unwrap_or(path);
        !excludes.is_match(relative)
    });

    if config.respect_gitignore && !notes.is_empty() {
        let ignored = git_ignored(root, &notes, cancel)?;
        if !ignored.is_empty() {
            log::debug!("Dropping {} git-ignored notes", ignored.len());
            notes.retain(|path| !ignored.contains(path));
        }
    }

    notes.sort();
    Some(notes)
}

fn build_excludes(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => log::warn!("Ignoring invalid exclude pattern {:?}: {}", pattern, e),
        }
    }
    builder.build().unwrap_or_else(|e| {
        log::warn!("Failed to build exclude set: {}", e);
        GlobSet::empty()
    })
}

/// Absolute paths among `files` that git reports as ignored.
///
/// Failures are logged and treated as "nothing ignored" for the failing chunk.
fn git_ignored(
    root: &Path,
    files: &[PathBuf],
    cancel: &CancellationToken,
) -> Option<HashSet<PathBuf>> {
    let relative: Vec<String> = files
        .iter()
        .filter_map(|path| path.strip_prefix(root).ok())
        .map(to_slash)
        .collect();

    let mut ignored = HashSet::new();
    for chunk in relative.chunks(GIT_CHUNK_SIZE) {
        if cancel.is_cancelled() {
            return None;
        }
        match check_ignore(root, chunk) {
            Ok(paths) => ignored.extend(paths.into_iter().map(|p| root.join(p))),
            Err(e) => {
                log::warn!("git check-ignore failed in {:?}: {}", root, e);
            }
        }
    }
    Some(ignored)
}

fn check_ignore(root: &Path, chunk: &[String]) -> std::io::Result<Vec<String>> {
    let mut child = Command::new("git")
        .args(["check-ignore", "--stdin", "-z"])
        .current_dir(root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(chunk.join("\0").as_bytes())?;
    }

    let output = child.wait_with_output()?;
    // 0: some paths ignored, 1: none ignored, anything else is an error
    match output.status.code() {
        Some(0) | Some(1) => Ok(output
            .stdout
            .split(|b| *b == 0)
            .filter(|p| !p.is_empty())
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()),
        code => Err(std::io::Error::other(format!(
            "git exited with {:?}: {}",
            code,
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::PhysicalFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn no_git() -> IndexConfig {
        IndexConfig {
            respect_gitignore: false,
            ..IndexConfig::default()
        }
    }

    #[test]
    fn test_lists_only_note_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.md"), "").unwrap();
        fs::write(root.join("b.TXT"), "").unwrap();
        fs::write(root.join("c.fountain"), "").unwrap();
        fs::write(root.join("d.rs"), "").unwrap();

        let notes = list_notes(root, &PhysicalFileSystem, &no_git(), &CancellationToken::new())
            .unwrap();
        let names: Vec<String> = notes
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.TXT", "c.fountain"]);
    }

    #[test]
    fn test_exclude_globs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("drafts")).unwrap();
        fs::write(root.join("node_modules/pkg/readme.md"), "").unwrap();
        fs::write(root.join("drafts/wip.md"), "").unwrap();
        fs::write(root.join("keep.md"), "").unwrap();

        let mut config = no_git();
        config.exclude.push("drafts/**".to_string());
        config.exclude.push("[invalid".to_string());

        let notes = list_notes(root, &PhysicalFileSystem, &config, &CancellationToken::new())
            .unwrap();
        assert_eq!(notes, vec![root.join("keep.md")]);
    }

    #[test]
    fn test_cancelled_enumeration_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.md"), "").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(list_notes(temp_dir.path(), &PhysicalFileSystem, &no_git(), &cancel).is_none());
    }

    #[test]
    fn test_gitignore_failure_keeps_notes() {
        // Not a git repository: check-ignore fails (or git is missing) and
        // every note is kept.
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.md"), "").unwrap();
        let notes = list_notes(
            temp_dir.path(),
            &PhysicalFileSystem,
            &IndexConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_gitignored_notes_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let initialized = Command::new("git")
            .args(["init", "-q"])
            .current_dir(root)
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        if !initialized {
            eprintln!("git unavailable, skipping");
            return;
        }

        fs::create_dir_all(root.join("private")).unwrap();
        fs::write(root.join(".gitignore"), "secret.md\nprivate/\n").unwrap();
        fs::write(root.join("keep.md"), "").unwrap();
        fs::write(root.join("secret.md"), "").unwrap();
        fs::write(root.join("private/diary.md"), "").unwrap();

        let notes = list_notes(
            root,
            &PhysicalFileSystem,
            &IndexConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(notes, vec![root.join("keep.md")]);
    }
}
