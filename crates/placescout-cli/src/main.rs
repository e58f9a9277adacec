mod output;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "placescout")]
#[command(about = "Collect place records from a map search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search around the configured coordinates and save the results as JSON
    Search {
        /// Free-text search, e.g. "coffee shop"
        #[arg(long, short)]
        query: String,
        /// Maximum number of places to extract
        #[arg(long, short, value_parser = parse_limit)]
        limit: usize,
        /// Directory for the results file (overrides `PLACESCOUT_OUTPUT_DIR`)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
        /// Print the search URL and exit without opening a browser
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_limit(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("limit must be greater than zero".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid limit: {e}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("placescout: no command given, see `placescout --help`");
        return Ok(());
    };

    let config = placescout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    match command {
        Commands::Search {
            query,
            limit,
            output_dir,
            headful,
            dry_run,
        } => {
            search::run_search(
                &config,
                &search::SearchArgs {
                    query: &query,
                    limit,
                    output_dir: output_dir.as_deref(),
                    headful,
                    dry_run,
                },
            )
            .await?;
        }
    }

    Ok(())
}
