use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use timewise::config::Config;
use timewise::server;

#[derive(Parser)]
#[command(name = "timewise", version, about = "TimeWise time-tracking backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve {
        /// Path to a TOML config file. Without one, defaults plus
        /// environment overrides apply.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the bind host.
        #[arg(long)]
        host: Option<String>,

        /// Override the bind port.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timewise=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { config, host, port } => {
            let mut config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::from_env(),
            };
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run_server(config).await
        }
    }
}
