//! obsws CLI binary.
//!
//! # Commands
//!
//! - `connect` - Connect to obs-websocket and run the auth handshake
//! - `credential` - Print the credential derived from password/salt/challenge

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use obsws::{
    derive_credential, AuthOutcome, Client, Config, ConnectionConfig, ConnectionOverrides, VERSION,
};

#[derive(Parser)]
#[command(name = "obsws")]
#[command(version = VERSION)]
#[command(about = "obs-websocket client handshake", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and authenticate
    Connect {
        /// obs-websocket host
        #[arg(long)]
        host: Option<String>,

        /// obs-websocket port
        #[arg(short, long)]
        port: Option<u16>,

        /// Shared password (also read from OBS_WS_PASSWORD)
        #[arg(long)]
        password: Option<String>,

        /// Config file path (default: <config dir>/obsws/config.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Deadline for connect + handshake in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Wait for the server to acknowledge the credential
        #[arg(long)]
        confirm: bool,
    },

    /// Print the credential for a password, salt and challenge
    Credential {
        /// Shared password
        password: String,

        /// Server-issued salt
        salt: String,

        /// Server-issued challenge
        challenge: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Connect {
            host,
            port,
            password,
            config,
            timeout,
            confirm,
        } => {
            let overrides = ConnectionOverrides {
                host,
                port,
                password,
                timeout_secs: timeout,
                confirm_auth: confirm.then_some(true),
            };
            let config = load_config(config, overrides)?;
            cmd_connect(&config).await
        },
        Commands::Credential {
            password,
            salt,
            challenge,
        } => {
            println!("{}", derive_credential(&password, &salt, &challenge));
            Ok(())
        },
    }
}

/// Layer file, environment and CLI settings, later sources winning.
fn load_config(
    path: Option<PathBuf>,
    cli: ConnectionOverrides,
) -> anyhow::Result<ConnectionConfig> {
    let file = match path {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path() {
            Some(path) if path.exists() => Config::from_file(path)?,
            _ => Config::default(),
        },
    };

    Ok(file
        .apply(ConnectionOverrides::from_env())
        .apply(cli)
        .connection)
}

async fn cmd_connect(config: &ConnectionConfig) -> anyhow::Result<()> {
    let mut client = Client::connect(config).await?;

    match client.outcome() {
        AuthOutcome::NotRequired => println!("Connected to {} (no authentication required)", client.url()),
        AuthOutcome::Submitted => println!(
            "Connected to {} (credential submitted, not acknowledged by server)",
            client.url()
        ),
        AuthOutcome::Confirmed => println!("Connected to {} (authenticated)", client.url()),
    }

    client.close().await?;
    Ok(())
}
