//! WikiLinks LSP Server Binary Entry Point

use tower_lsp::Server;
use wikilinks_lsp::create_lsp_service;

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("WikiLinks LSP server starting on stdin/stdout");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = create_lsp_service();
    Server::new(stdin, stdout, socket).serve(service).await;
}
