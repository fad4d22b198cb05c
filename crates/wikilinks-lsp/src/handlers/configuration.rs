use tower_lsp::lsp_types::*;
use tower_lsp::Client;

use crate::state::GlobalState;

/// Settings section read from `workspace/didChangeConfiguration`
pub const SETTINGS_SECTION: &str = "wikilinks";

pub async fn handle_did_change_configuration(
    client: &Client,
    state: &GlobalState,
    params: DidChangeConfigurationParams,
) {
    let Some(section) = params.settings.get(SETTINGS_SECTION) else {
        log::debug!("Configuration change without a {:?} section", SETTINGS_SECTION);
        return;
    };

    let merged = state.config.read().await.merged_with(section);
    match merged {
        Ok(new_settings) => {
            new_settings.apply_log_level();
            *state.config.write().await = new_settings;
            // exclude patterns may have changed
            state.invalidate().await;

            client
                .log_message(MessageType::INFO, "LSP settings updated")
                .await;
        }
        Err(e) => {
            client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to parse updated settings: {}", e),
                )
                .await;
        }
    }
}
