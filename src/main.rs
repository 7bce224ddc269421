//! docsum entrypoint.
//!
//! `docsum summarize <PATH>` prints a summary of one document to stdout. `docsum serve` starts the
//! HTTP API. Both share the same configuration and pipeline.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsum::{
    api, config, logging,
    processing::{SummaryMode, Summarizer},
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "docsum", about = "Summarize documents with a hosted language model")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize one file and print the result.
    Summarize {
        /// Document to summarize; the extension selects the extractor.
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = SummaryMode::Short)]
        mode: SummaryMode,
    },
    /// Serve the HTTP API.
    Serve {
        /// Port to bind; overrides SERVER_PORT.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_config().context("invalid configuration")?;
    logging::init_tracing(if cli.verbose { "debug" } else { "info" });

    let config = config::get_config();
    tracing::debug!(
        base_url = %config.groq_base_url,
        model = %config.model,
        credential_present = config.groq_api_key.is_some(),
        chunk_size = config.chunk_size,
        max_chunks = config.max_chunks,
        map_concurrency = config.map_concurrency,
        server_port = ?config.server_port,
        "Loaded configuration"
    );

    let summarizer = Summarizer::from_config(config)
        .context("failed to initialize the language model client")?;

    match cli.command {
        Command::Summarize { path, mode } => summarize_file(&summarizer, path, mode).await,
        Command::Serve { port } => serve(summarizer, port).await,
    }
}

async fn summarize_file(summarizer: &Summarizer, path: PathBuf, mode: SummaryMode) -> Result<()> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let outcome = summarizer.summarize(file_name, bytes, mode).await?;
    println!("{}", outcome.summary);
    if outcome.truncated() {
        eprintln!(
            "note: summarized the first {} of {} chunks; the rest of the document was not read",
            outcome.chunks_summarized, outcome.chunk_count
        );
    }
    Ok(())
}

async fn serve(summarizer: Summarizer, port: Option<u16>) -> Result<()> {
    let app = api::create_router(Arc::new(summarizer));
    let (listener, port) = bind_listener(port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn bind_listener(port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = port.or(config::get_config().server_port) {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4100..=4199;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4100-4199",
    ))
}
