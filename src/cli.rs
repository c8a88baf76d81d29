//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

/// Call the admin console API through the request gateway.
///
/// Requests carry the stored access token and the current workspace scope;
/// responses are unwrapped from the `{code, data, msg}` envelope.
#[derive(Parser, Debug)]
#[command(name = "request-gateway")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/request-gateway/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Workspace id injected into scoped requests
    #[arg(long, global = true, value_name = "ID")]
    pub scope_id: Option<i64>,

    /// Persisted token file (default: next to the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a JSON API request and print the unwrapped `data`
    Send {
        /// HTTP method (GET, POST, PUT, DELETE, ...)
        #[arg(value_parser = parse_method)]
        method: Method,
        /// Path relative to the base URL, or an absolute URL
        url: String,
        /// Query parameters as a JSON object
        #[arg(long, value_parser = parse_json)]
        query: Option<Value>,
        /// Request body as JSON
        #[arg(long, value_parser = parse_json)]
        body: Option<Value>,
    },

    /// Download a binary payload to a directory
    Download {
        /// Path relative to the base URL, or an absolute URL
        url: String,
        /// HTTP method
        #[arg(long, default_value = "GET", value_parser = parse_method)]
        method: Method,
        /// Request body as JSON
        #[arg(long, value_parser = parse_json)]
        body: Option<Value>,
        /// Directory to save into
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        output_dir: PathBuf,
        /// Name to use when the server does not send one
        #[arg(long)]
        filename: Option<String>,
    },

    /// Manage the stored access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Store an access token
    Set {
        /// Token value, with or without the `Bearer ` prefix
        value: String,
    },
    /// Remove the stored access token
    Clear,
}

fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid HTTP method: {e}"))
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}
