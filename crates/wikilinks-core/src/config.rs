use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::NamingConvention;

/// Name of the optional workspace-level configuration file.
pub const CONFIG_FILE_NAME: &str = ".wikilinks.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level configuration for wiki-link resolution.
///
/// Passed by value into every operation; nothing is read from a global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiLinksConfig {
    /// How link text maps to a document
    #[serde(default, alias = "workspaceFilenameConvention")]
    pub naming_convention: NamingConvention,

    /// Create the target note when go-to-definition finds nothing
    #[serde(
        default = "default_true",
        rename = "createMissingOnGoToDefinition",
        alias = "createNoteOnGoToDefinitionWhenMissing"
    )]
    pub create_missing_on_goto_definition: bool,

    /// Ask the client to re-open suggestions after edits inside a link
    #[serde(default = "default_true", alias = "triggerSuggestOnReplacement")]
    pub trigger_live_suggest_on_edit: bool,

    #[serde(default)]
    pub new_note: NewNoteConfig,

    #[serde(default)]
    pub index: IndexConfig,
}

/// Settings of the new-note commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNoteConfig {
    #[serde(default)]
    pub directory: NoteDirectory,
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
    #[serde(default = "default_content_template")]
    pub content_template: String,
    #[serde(default = "default_selection_template")]
    pub selection_replacement_template: String,
    #[serde(default = "default_true")]
    pub lowercase_filename: bool,
    /// strftime pattern for `${timestamp}`
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

/// Where new notes are created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteDirectory {
    #[default]
    SameAsActiveDocument,
    WorkspaceRoot,
    /// Sub-directory relative to the workspace root
    Subpath(PathBuf),
}

impl NoteDirectory {
    pub const SAME_AS_ACTIVE_NOTE: &'static str = "SAME_AS_ACTIVE_NOTE";
    pub const WORKSPACE_ROOT: &'static str = "WORKSPACE_ROOT";

    /// Directory to create a note in
    pub fn resolve(&self, root: &Path, active_document: Option<&Path>) -> PathBuf {
        match self {
            NoteDirectory::SameAsActiveDocument => active_document
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            NoteDirectory::WorkspaceRoot => root.to_path_buf(),
            NoteDirectory::Subpath(sub) => {
                let relative = sub.strip_prefix("/").unwrap_or(sub);
                root.join(relative)
            }
        }
    }
}

impl From<String> for NoteDirectory {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | Self::SAME_AS_ACTIVE_NOTE => NoteDirectory::SameAsActiveDocument,
            Self::WORKSPACE_ROOT => NoteDirectory::WorkspaceRoot,
            other => NoteDirectory::Subpath(PathBuf::from(other)),
        }
    }
}

impl From<NoteDirectory> for String {
    fn from(value: NoteDirectory) -> Self {
        match value {
            NoteDirectory::SameAsActiveDocument => NoteDirectory::SAME_AS_ACTIVE_NOTE.to_string(),
            NoteDirectory::WorkspaceRoot => NoteDirectory::WORKSPACE_ROOT.to_string(),
            NoteDirectory::Subpath(path) => path.to_string_lossy().to_string(),
        }
    }
}

/// Note discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// Keep the enumerated note list between requests
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
    /// Exclude patterns (glob syntax), matched against workspace-relative paths
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Filter out files ignored by git
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

fn default_true() -> bool {
    true
}

fn default_filename_template() -> String {
    crate::utils::template::NOTE_NAME.to_string()
}

fn default_content_template() -> String {
    format!("# {}\n\n", crate::utils::template::NOTE_NAME)
}

fn default_selection_template() -> String {
    format!("[[{}]]", crate::utils::template::NOTE_NAME)
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_exclude() -> Vec<String> {
    vec!["**/.git/**".to_string(), "**/node_modules/**".to_string()]
}

impl Default for WikiLinksConfig {
    fn default() -> Self {
        Self {
            naming_convention: NamingConvention::UniqueBasename,
            create_missing_on_goto_definition: true,
            trigger_live_suggest_on_edit: true,
            new_note: NewNoteConfig::default(),
            index: IndexConfig::default(),
        }
    }
}

impl Default for NewNoteConfig {
    fn default() -> Self {
        Self {
            directory: NoteDirectory::SameAsActiveDocument,
            filename_template: default_filename_template(),
            content_template: default_content_template(),
            selection_replacement_template: default_selection_template(),
            lowercase_filename: true,
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            exclude: default_exclude(),
            respect_gitignore: true,
        }
    }
}

impl WikiLinksConfig {
    /// Parse a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply camelCase JSON settings (LSP initialization options or
    /// `didChangeConfiguration`) on top of this config. Keys that are absent
    /// keep their current value.
    pub fn merged_with(&self, overrides: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, &with_current_names(overrides));
        serde_json::from_value(base)
    }
}

/// Setting names of older clients, paired with the name they map to.
/// Serde aliases cover YAML; merged JSON already carries the current name,
/// so the old one has to be renamed before merging.
const LEGACY_SETTING_NAMES: &[(&str, &str)] = &[
    ("workspaceFilenameConvention", "namingConvention"),
    (
        "createNoteOnGoToDefinitionWhenMissing",
        "createMissingOnGoToDefinition",
    ),
    ("triggerSuggestOnReplacement", "triggerLiveSuggestOnEdit"),
];

/// Current names win when a blob carries both.
fn with_current_names(overrides: &serde_json::Value) -> serde_json::Value {
    let mut overrides = overrides.clone();
    if let serde_json::Value::Object(map) = &mut overrides {
        for (legacy, current) in LEGACY_SETTING_NAMES {
            if let Some(value) = map.remove(*legacy) {
                map.entry(*current).or_insert(value);
            }
        }
    }
    overrides
}

fn merge_json(base: &mut serde_json::Value, overrides: &serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = WikiLinksConfig::from_yaml("{}").unwrap();
        assert_eq!(config, WikiLinksConfig::default());
    }

    #[test]
    fn test_yaml_round_trip_keeps_directory_policy() {
        let mut config = WikiLinksConfig::default();
        config.naming_convention = NamingConvention::RelativePath;
        config.new_note.directory = NoteDirectory::Subpath(PathBuf::from("inbox"));

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("relativePaths"));
        assert!(yaml.contains("inbox"));
        assert_eq!(WikiLinksConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_legacy_setting_names() {
        let yaml = "workspaceFilenameConvention: relativePaths\n\
                    createNoteOnGoToDefinitionWhenMissing: false\n\
                    newNote:\n  directory: WORKSPACE_ROOT\n";
        let config = WikiLinksConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.naming_convention, NamingConvention::RelativePath);
        assert!(!config.create_missing_on_goto_definition);
        assert_eq!(config.new_note.directory, NoteDirectory::WorkspaceRoot);
    }

    #[test]
    fn test_merged_with_partial_override() {
        let base = WikiLinksConfig::default();
        let merged = base
            .merged_with(&serde_json::json!({
                "namingConvention": "relativePaths",
                "index": { "respectGitignore": false }
            }))
            .unwrap();

        assert_eq!(merged.naming_convention, NamingConvention::RelativePath);
        assert!(!merged.index.respect_gitignore);
        assert!(merged.index.cache_enabled);
        assert_eq!(merged.index.exclude, base.index.exclude);
    }

    #[test]
    fn test_merged_with_legacy_setting_names() {
        let merged = WikiLinksConfig::default()
            .merged_with(&serde_json::json!({
                "workspaceFilenameConvention": "relativePaths",
                "createNoteOnGoToDefinitionWhenMissing": false,
                "triggerSuggestOnReplacement": false,
                "newNote": { "lowercaseFilename": false }
            }))
            .unwrap();

        assert_eq!(merged.naming_convention, NamingConvention::RelativePath);
        assert!(!merged.create_missing_on_goto_definition);
        assert!(!merged.trigger_live_suggest_on_edit);
        assert!(!merged.new_note.lowercase_filename);
    }

    #[test]
    fn test_current_setting_name_wins_over_legacy() {
        let merged = WikiLinksConfig::default()
            .merged_with(&serde_json::json!({
                "workspaceFilenameConvention": "relativePaths",
                "namingConvention": "uniqueFilenames"
            }))
            .unwrap();
        assert_eq!(merged.naming_convention, NamingConvention::UniqueBasename);
    }

    #[test]
    fn test_invalid_convention_is_rejected() {
        assert!(WikiLinksConfig::from_yaml("namingConvention: sometimes").is_err());
    }

    #[test]
    fn test_note_directory_resolution() {
        let root = Path::new("/ws");
        let active = Path::new("/ws/a/b/note.md");
        assert_eq!(
            NoteDirectory::SameAsActiveDocument.resolve(root, Some(active)),
            PathBuf::from("/ws/a/b")
        );
        assert_eq!(
            NoteDirectory::SameAsActiveDocument.resolve(root, None),
            PathBuf::from("/ws")
        );
        assert_eq!(
            NoteDirectory::Subpath(PathBuf::from("inbox/new")).resolve(root, Some(active)),
            PathBuf::from("/ws/inbox/new")
        );
    }
}
