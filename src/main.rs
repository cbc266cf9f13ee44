use clap::{Parser, Subcommand};
use configuration::load_config;
use database::connection::{connect, run_migrations};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// The main entry point for the school records backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (DATABASE_URL) from the .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let mut config = load_config()?;
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config).await
        }
        Commands::Migrate => {
            let config = load_config()?;
            let pool = connect(
                config.database.max_connections,
                Duration::from_secs(config.database.acquire_timeout_secs),
            )
            .await?;
            run_migrations(&pool).await?;
            tracing::info!("Database migrations applied.");
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Administrative backend for the school records system.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to bind, overriding config.toml (e.g. "0.0.0.0").
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overriding config.toml.
    #[arg(long)]
    port: Option<u16>,
}
