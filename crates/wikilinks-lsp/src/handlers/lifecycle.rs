use std::path::PathBuf;
use std::sync::Arc;

use tower_lsp::jsonrpc::{Error, ErrorCode, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use wikilinks_core::Workspace;

use crate::config::LspSettings;
use crate::protocol::{NEW_NOTE_COMMAND, NEW_NOTE_FROM_SELECTION_COMMAND};
use crate::state::GlobalState;

const NOTE_GLOB: &str = "**/*.{md,markdown,mdx,fountain,txt}";

fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    let from_folders = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri);

    params
        .root_uri
        .as_ref()
        .or(from_folders)
        .and_then(|uri| uri.to_file_path().ok())
}

/// Handle "initialize" request
pub async fn handle_initialize(
    client: &Client,
    state: &GlobalState,
    params: InitializeParams,
) -> Result<InitializeResult> {
    if let Some(root_path) = workspace_root(&params) {
        client
            .log_message(
                MessageType::INFO,
                format!("Initializing workspace at: {:?}", root_path),
            )
            .await;

        let fs = state.fs.clone();
        let root = root_path.clone();
        let mut settings = tokio::task::spawn_blocking(move || LspSettings::load(&root, &*fs))
            .await
            .map_err(|e| Error {
                code: ErrorCode::InternalError,
                message: format!("Failed to initialize workspace: {}", e).into(),
                data: None,
            })?;

        if let Some(options) = &params.initialization_options {
            match settings.merged_with(options) {
                Ok(merged) => settings = merged,
                Err(e) => {
                    client
                        .log_message(
                            MessageType::ERROR,
                            format!("Ignoring initializationOptions: {}", e),
                        )
                        .await;
                }
            }
        }
        settings.apply_log_level();

        *state.config.write().await = settings;
        *state.workspace.write().await =
            Some(Arc::new(Workspace::new(root_path, state.fs.clone())));
    } else {
        client
            .log_message(MessageType::WARNING, "No rootUri provided!")
            .await;
    }

    Ok(InitializeResult {
        capabilities: server_capabilities(),
        server_info: Some(ServerInfo {
            name: "wikilinks".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::INCREMENTAL),
                save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                ..Default::default()
            },
        )),
        definition_provider: Some(OneOf::Left(true)),
        references_provider: Some(OneOf::Left(true)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec!["[".to_string()]),
            all_commit_characters: None,
            resolve_provider: Some(true),
            work_done_progress_options: Default::default(),
            completion_item: Default::default(),
        }),
        execute_command_provider: Some(ExecuteCommandOptions {
            commands: vec![
                NEW_NOTE_COMMAND.to_string(),
                NEW_NOTE_FROM_SELECTION_COMMAND.to_string(),
            ],
            work_done_progress_options: Default::default(),
        }),
        workspace: Some(WorkspaceServerCapabilities {
            workspace_folders: None,
            file_operations: Some(WorkspaceFileOperationsServerCapabilities {
                did_rename: Some(FileOperationRegistrationOptions {
                    filters: vec![FileOperationFilter {
                        scheme: Some("file".to_string()),
                        pattern: FileOperationPattern {
                            glob: "**/*".to_string(),
                            matches: None,
                            options: None,
                        },
                    }],
                }),
                ..Default::default()
            }),
        }),
        ..Default::default()
    }
}

/// Handle "initialized" notification: ask the client to watch note files.
pub async fn handle_initialized(client: &Client) {
    let options = DidChangeWatchedFilesRegistrationOptions {
        watchers: vec![FileSystemWatcher {
            glob_pattern: GlobPattern::String(NOTE_GLOB.to_string()),
            kind: None,
        }],
    };

    if let Err(e) = client
        .register_capability(vec![Registration {
            id: "wikilinks-watched-files".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: serde_json::to_value(options).ok(),
        }])
        .await
    {
        log::warn!("Failed to register file watcher: {}", e);
    }
    log::info!("Client initialized, ready to accept requests");
}
