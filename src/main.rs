use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poker_scout::config::TrackerConfig;
use poker_scout::web;
use poker_scout::{Report, ReportOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "poker-scout",
    version,
    about = "Hand-history tracker and opponent statistics",
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file (defaults apply for missing keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the tracking server the automation layer posts to
    Serve {
        /// Address to bind (HOST:PORT)
        #[arg(long, default_value = "127.0.0.1:8787")]
        addr: String,
    },
    /// Print statistics for exported hand records
    Report {
        /// JSON file holding an array of hand records
        #[arg(long)]
        hands: PathBuf,

        /// Only report these players (repeatable); defaults to everyone seen
        #[arg(long = "player")]
        players: Vec<String>,

        /// Disable ANSI colors
        #[arg(long = "no-color", default_value_t = false)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = color_eyre::install();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TrackerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { addr } => {
            let addr: SocketAddr = addr.parse()?;
            web::serve(addr, config).await?
        }
        Commands::Report {
            hands,
            players,
            no_color,
        } => {
            let raw = std::fs::read_to_string(&hands)
                .with_context(|| format!("reading {}", hands.display()))?;
            let records = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", hands.display()))?;
            let report = Report::build(
                records,
                &ReportOptions {
                    players,
                    hero_name: config.hero_name.clone(),
                },
            );
            report.print(no_color);
        }
    }

    Ok(())
}
