//! termlink - inline glossary link resolution for article markdown
//!
//! Scans article content for whitelisted glossary terms and cached
//! heading titles and rewrites them into links to standalone pages.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

use termlink::headings::PassthroughTitleGenerator;
use termlink::server::{self, AppState};

#[derive(Debug, Parser)]
#[command(name = "termlink", about = "Inline glossary link resolution server")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API server backed by the in-memory store
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Serve { port } => {
            let engine = termlink::memory_engine(Arc::new(PassthroughTitleGenerator));
            let state = Arc::new(AppState { engine });
            server::run(state, port).await
        }
    }
}
