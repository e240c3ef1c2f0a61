use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

mod commands;
mod config;

use brewbuddy_core::{FileStore, LocalAuth, Session};
use commands::{AuthCommand, BrewCommand, ConfigCommand};
use config::Config;

#[derive(Parser)]
#[command(name = "brewbuddy")]
#[command(version)]
#[command(about = "A coffee brew journaling application", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the signed-in account
    Auth(AuthCommand),

    /// Record and browse brews
    Brew(BrewCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;
    tracing::debug!("using data dir {}", config.data_dir.display());

    match cli.command {
        Some(Commands::Auth(cmd)) => {
            let (auth, store) = open_backends(&config)?;
            let session = Session::new(auth, store);
            cmd.run(&session).await?;
        }
        Some(Commands::Brew(cmd)) => {
            let (auth, store) = open_backends(&config)?;
            let session = Session::new(auth, Arc::clone(&store));
            cmd.run(&session, store).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

fn open_backends(
    config: &Config,
) -> Result<(Arc<LocalAuth>, Arc<FileStore>), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.data_dir)?;
    let auth = Arc::new(LocalAuth::load(config.data_dir.join("auth.json")));
    let store = Arc::new(FileStore::open(config.data_dir.join("journal.json"))?);
    tracing::debug!("opened journal store at {}", store.path().display());
    Ok((auth, store))
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
