// deluge-rpc - command line client for the Deluge web daemon
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

use deluge_rpc::config::load_config;
use deluge_rpc::{DelugeClient, RpcError};

#[derive(Parser, Debug)]
#[command(name = "deluge-rpc")]
#[command(about = "Call Deluge web daemon methods over JSON-RPC", version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ~/.deluge-rpc/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Daemon host (default: localhost)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Daemon web port (default: 8181)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Web UI password
    #[arg(long, global = true)]
    password: Option<String>,

    /// File used to persist the session cookie between runs
    #[arg(long = "cookie-path", global = true)]
    cookie_path: Option<PathBuf>,

    /// Request timeout in seconds, 0 disables it
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every method the daemon exposes
    Methods,
    /// Print the command tree as JSON
    Tree,
    /// Call a method, e.g. `call core.get_torrents_status '{}' '["name"]'`
    Call {
        /// Fully-qualified method name
        method: String,
        /// Arguments; each is parsed as JSON, falling back to a plain string
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut params =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(host) = args.host {
        params.host = host;
    }
    if let Some(port) = args.port {
        params.port = port;
    }
    if let Some(password) = args.password {
        params.password = Some(password);
    }
    if let Some(cookie_path) = args.cookie_path {
        params.cookie_path = Some(cookie_path);
    }
    if let Some(timeout) = args.timeout {
        params.timeout_secs = timeout;
    }

    let client = DelugeClient::connect(params).await.map_err(report)?;

    match args.command {
        Command::Methods => {
            for name in client.help().method_names() {
                println!("{}", name);
            }
        }
        Command::Tree => {
            println!("{}", serde_json::to_string_pretty(client.help())?);
        }
        Command::Call { method, args } => {
            let arguments = args.iter().map(|raw| parse_argument(raw)).collect();
            let result = client.invoke(&method, arguments).await.map_err(report)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Print the error's hint to stderr and hand the error to anyhow
fn report(error: RpcError) -> anyhow::Error {
    if let Some(hint) = error.hint() {
        eprintln!("{}", hint);
    }
    anyhow::Error::new(error)
}

fn parse_argument(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn init_tracing(verbose: bool) {
    // Default: WARN (DEBUG with -v); RUST_LOG overrides
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Bridge log crate → tracing (reqwest and hyper log through `log`)
    tracing_log::LogTracer::init().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_argument() {
        assert_eq!(parse_argument("42"), json!(42));
        assert_eq!(parse_argument("[\"name\",\"state\"]"), json!(["name", "state"]));
        assert_eq!(parse_argument("{}"), json!({}));
        assert_eq!(
            parse_argument("magnet:?xt=urn:btih:abc"),
            json!("magnet:?xt=urn:btih:abc")
        );
    }

    #[test]
    fn test_cli_parses_call() {
        let args = Args::try_parse_from([
            "deluge-rpc",
            "--host",
            "nas",
            "call",
            "core.add_torrent_magnet",
            "magnet:?xt=urn:btih:abc",
            "{}",
        ])
        .unwrap();
        assert_eq!(args.host.as_deref(), Some("nas"));
        match args.command {
            Command::Call { method, args } => {
                assert_eq!(method, "core.add_torrent_magnet");
                assert_eq!(args.len(), 2);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
