use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use snippet_relay::config::Config;
use snippet_relay::notion::{NotionApi, NotionClient};
use snippet_relay::server::{self, AppState};
use snippet_relay::snippets::{SnippetApi, SnippetClient};

/// Relay server in front of the shared Notion database and the snippet
/// webhook service.
#[derive(Parser)]
#[clap(name = "snippet-relay", version)]
struct Cli {
    /// Address to listen on.
    #[clap(long, default_value = "0.0.0.0:8000")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);

    let notion: Arc<dyn NotionApi> = Arc::new(NotionClient::new(&config));
    let snippets: Arc<dyn SnippetApi> = Arc::new(SnippetClient::new(&config));
    let state = Arc::new(AppState {
        config,
        notion,
        snippets,
    });

    let app = server::router(state);
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    info!(addr = %cli.bind, "snippet-relay listening");
    axum::serve(listener, app).await?;

    Ok(())
}
