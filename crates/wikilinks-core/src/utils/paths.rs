use std::path::{Component, Path, PathBuf};

/// Render a relative path with forward slashes on every platform.
pub fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy().to_string();
    if std::path::MAIN_SEPARATOR == '\\' {
        s.replace('\\', "/")
    } else {
        s
    }
}

/// Lexically resolve `.` and `..` components. Does not touch the disk.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(cleaned.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Path of `target` as seen from directory `base`, using `..` where needed.
///
/// ```
/// use std::path::Path;
/// use wikilinks_core::utils::paths::relative_path;
///
/// assert_eq!(relative_path(Path::new("/v/a"), Path::new("/v/a/sub/n.md")), Path::new("sub/n.md"));
/// assert_eq!(relative_path(Path::new("/v/a"), Path::new("/v/b/n.md")), Path::new("../b/n.md"));
/// ```
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base = clean_path(base);
    let target = clean_path(target);
    if let Ok(stripped) = target.strip_prefix(&base) {
        return stripped.to_path_buf();
    }

    let base_parts: Vec<Component> = base.components().collect();
    let target_parts: Vec<Component> = target.components().collect();
    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(clean_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(clean_path(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_relative_path_siblings_and_children() {
        assert_eq!(
            relative_path(Path::new("/v/a"), Path::new("/v/a/x.md")),
            PathBuf::from("x.md")
        );
        assert_eq!(
            relative_path(Path::new("/v/a/b"), Path::new("/v/c/x.md")),
            PathBuf::from("../../c/x.md")
        );
    }

    #[test]
    fn test_to_slash() {
        let path: PathBuf = ["sub", "note.md"].iter().collect();
        assert_eq!(to_slash(&path), "sub/note.md");
    }
}
