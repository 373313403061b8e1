use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tether_cli::{transport, Config};

#[derive(Parser)]
#[command(name = "tether")]
#[command(author, about = "Tether - terminal chat client for agent backends", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), env!("TETHER_VERSION_SUFFIX")))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat with the agent backend
    Chat {
        /// Initial message to send once the connection opens
        message: Option<String>,

        /// WebSocket endpoint (overrides the configured one)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Print the configuration file path, writing defaults on first use
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "tether_cli=debug"
    } else {
        "tether_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Chat { message, url } => {
            let mut config = Config::load()?;
            if let Some(url) = url {
                config.connection.url = url;
            }
            tracing::info!("connecting to {}", config.connection.url);
            transport::cli::run_chat(config, message).await?;
        }
        Commands::Config => {
            let path = Config::config_path()?;
            if !path.exists() {
                Config::default().save()?;
            }
            println!("{}", path.display());
        }
    }

    Ok(())
}
