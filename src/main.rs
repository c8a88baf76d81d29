//! CLI entry point for the request gateway.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use request_gateway::config::resolve_default_token_path;
use request_gateway::{
    ApiRequest, Collaborators, DirectorySink, DownloadOptions, FileTokenStore, GatewayConfig,
    LocalSession, RequestGateway, StreamDownloader, TokenStore, mask_secret,
};
use tracing::{debug, info};

mod cli;

use cli::{Args, Command, TokenAction};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = GatewayConfig::load(args.config.as_deref()).context("failed to load config")?;
    let token_path = resolve_token_path(args.token_file.clone())?;
    let tokens = Arc::new(
        FileTokenStore::open(&token_path)
            .with_context(|| format!("failed to open token file {}", token_path.display()))?,
    );
    let session = Arc::new(LocalSession::new(tokens.clone(), &config.token_key));
    session.set_scope_id(args.scope_id);

    match args.command {
        Command::Send {
            method,
            url,
            query,
            body,
        } => {
            let collaborators = Collaborators::terminal(session, tokens);
            let gateway = RequestGateway::from_config(&config, collaborators)
                .context("failed to build HTTP client")?;

            let mut request = ApiRequest::new(method, url);
            request.query = query;
            if let Some(body) = body {
                request = request.with_json(body);
            }

            let data = gateway.send(request).await?.into_data().unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Download {
            url,
            method,
            body,
            output_dir,
            filename,
        } => {
            let sink = Arc::new(DirectorySink::new(output_dir));
            let downloader = StreamDownloader::new(&config, session, tokens, sink);

            let mut request = ApiRequest::new(method, url);
            if let Some(body) = body {
                request = request.with_json(body);
            }
            let mut options = DownloadOptions::from_config(&config);
            options.filename = filename;

            let saved = downloader.fetch_and_save(request, &options).await?;
            info!(path = %saved.path.display(), "saved");
            println!("{}", saved.path.display());
        }
        Command::Token { action } => match action {
            TokenAction::Set { value } => {
                tokens.set(&config.token_key, value.trim())?;
                info!(
                    token = %mask_secret(value.trim()),
                    file = %token_path.display(),
                    "access token stored"
                );
            }
            TokenAction::Clear => {
                tokens.remove(&config.token_key)?;
                info!(file = %token_path.display(), "access token cleared");
            }
        },
    }

    Ok(())
}

fn resolve_token_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    explicit
        .or_else(resolve_default_token_path)
        .context("cannot determine token file location; pass --token-file")
}
