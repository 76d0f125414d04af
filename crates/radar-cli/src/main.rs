use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use radar_security::RedactingWriter;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "radar")]
#[command(version, about = "AI and security signal radar with conversational deep dives", long_about = None)]
struct Cli {
    /// Config file (default: ~/.radar/config.yml)
    #[arg(long, global = true, env = "RADAR_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook gateway (Telegram webhook, alert ingestion, health)
    Serve,
    /// Scan feeds and GitHub for high-signal items and send one alert
    Scan {
        /// Print the alert instead of sending it
        #[arg(long)]
        dry_run: bool,
        /// Repeat the scan every N minutes instead of exiting
        #[arg(long, value_name = "MINUTES")]
        every: Option<u64>,
    },
    /// Check that the completion provider is reachable
    Check,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(RedactingWriter::stderr());
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values in .env behave like real environment variables.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let loader = radar_config::ConfigLoader::new(cli.config);
    let config = loader.load()?;

    match cli.command {
        Commands::Serve => commands::serve::run(config).await?,
        Commands::Scan { dry_run, every } => commands::scan::run(config, dry_run, every).await?,
        Commands::Check => commands::check::run(config).await?,
    }

    Ok(())
}
