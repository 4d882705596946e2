use anyhow::Result;
use axum::Router;
use clap::Parser;
use soundseek_core::SearchOptions;
use soundseek_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Folder of .txt documents to index at startup
    #[arg(long, default_value = "./corpus")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Fail startup if the index build takes longer than this many seconds
    #[arg(long)]
    build_timeout_secs: Option<u64>,
    /// Disable the phonetic fallback for unknown query terms
    #[arg(long, default_value_t = false)]
    no_phonetic: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let config = ServerConfig {
        corpus: args.corpus,
        options: SearchOptions {
            phonetic_fallback: !args.no_phonetic,
            build_timeout: args.build_timeout_secs.map(Duration::from_secs),
        },
    };
    let app: Router = build_app(&config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
