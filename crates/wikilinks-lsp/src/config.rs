use std::path::Path;

use serde::{Deserialize, Serialize};
use wikilinks_core::config::CONFIG_FILE_NAME;
use wikilinks_core::{FileSystem, WikiLinksConfig};

/// Settings of the running server: the core configuration plus what only
/// the server cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LspSettings {
    /// Logging level for the LSP server
    pub log_level: LogLevel,

    pub wiki_links: WikiLinksConfig,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl LspSettings {
    /// Settings for a workspace: `.wikilinks.yaml` at `root` when present,
    /// defaults otherwise. A broken file is reported and ignored.
    pub fn load(root: &Path, fs: &dyn FileSystem) -> Self {
        let path = root.join(CONFIG_FILE_NAME);
        if !fs.is_file(&path) {
            return Self::default();
        }

        let wiki_links = match fs.read_to_string(&path) {
            Ok(content) => match WikiLinksConfig::from_yaml(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Ignoring {:?}: {}", path, e);
                    WikiLinksConfig::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read {:?}: {}", path, e);
                WikiLinksConfig::default()
            }
        };

        Self {
            wiki_links,
            ..Self::default()
        }
    }

    /// Apply client-side settings (camelCase JSON) on top of these.
    pub fn merged_with(&self, overrides: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let log_level = match overrides.get("logLevel") {
            Some(level) => serde_json::from_value(level.clone())?,
            None => self.log_level,
        };

        Ok(Self {
            log_level,
            wiki_links: self.wiki_links.merged_with(overrides)?,
        })
    }

    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level.to_level_filter());
    }
}
