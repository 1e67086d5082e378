use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::signal;

use scan_inventory_client::{
    config::Settings,
    logging,
    models::{ChatMessage, SummaryPoll, UploadFile},
    ClientState,
};

/// Query the scan inventory: hosts, certificates, uploads, summaries and chat
#[derive(Parser, Debug)]
#[command(name = "scan-inventory", version, about)]
struct Cli {
    /// Serve bundled fixtures instead of calling the API
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every scanned host
    Hosts,
    /// Show one host by IP address
    Host { ip: String },
    /// List every web asset (certificate)
    Web,
    /// Show one web asset by id or covered domain
    WebAsset { key: String },
    /// Upload a JSON host inventory file
    UploadHosts { path: PathBuf },
    /// Upload a JSON web asset inventory file
    UploadWeb { path: PathBuf },
    /// Fetch the AI security summary for a web asset
    Summary {
        key: String,
        /// Check once instead of polling until the summary settles
        #[arg(long)]
        once: bool,
    },
    /// Ask the assistant a question
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
        /// Attach a host (by IP) or web asset (by id or domain) as context
        #[arg(long)]
        asset: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Settings::new().context("failed to load configuration")?;
    if cli.mock {
        config.use_mock_data = true;
    }

    logging::init_logging(&config.log_level, &config.log_format)
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))?;

    tracing::debug!("Starting scan-inventory v{}", env!("CARGO_PKG_VERSION"));

    let state = ClientState::new(config)?;
    run(&state, cli.command).await
}

async fn run(state: &ClientState, command: Command) -> anyhow::Result<()> {
    let source = &state.data_source;

    match command {
        Command::Hosts => print_json(&source.list_hosts().await?),
        Command::Host { ip } => print_json(&source.get_host(&ip).await?),
        Command::Web => print_json(&source.list_web_assets().await?),
        Command::WebAsset { key } => print_json(&source.get_web_asset(&key).await?),
        Command::UploadHosts { path } => {
            let file = read_upload(&path).await?;
            print_json(&source.upload_hosts(&file).await?)
        }
        Command::UploadWeb { path } => {
            let file = read_upload(&path).await?;
            print_json(&source.upload_web_assets(&file).await?)
        }
        Command::Summary { key, once } => {
            if once {
                return print_json(&source.poll_security_summary(&key).await?);
            }

            let poller = state.poller();
            let observe = |poll: &SummaryPoll| {
                tracing::info!(key = %key, status = %poll.status, "security summary status");
            };

            tokio::select! {
                result = poller.watch(&key, observe) => print_json(&result?),
                _ = shutdown_signal() => {
                    tracing::info!("Polling cancelled");
                    Ok(())
                }
            }
        }
        Command::Chat { message, asset } => {
            let context = match asset {
                Some(key) => Some(asset_context(state, &key).await?),
                None => None,
            };
            let transcript = [ChatMessage::user(message.join(" "))];
            let reply = source.send_chat(&transcript, context).await?;
            println!("{}", reply);
            Ok(())
        }
    }
}

async fn read_upload(path: &Path) -> anyhow::Result<UploadFile> {
    UploadFile::from_path(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// IP-shaped keys attach a host, anything else a web asset
async fn asset_context(state: &ClientState, key: &str) -> anyhow::Result<Value> {
    let value = if key.parse::<IpAddr>().is_ok() {
        serde_json::to_value(state.data_source.get_host(key).await?)?
    } else {
        serde_json::to_value(state.data_source.get_web_asset(key).await?)?
    };
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
