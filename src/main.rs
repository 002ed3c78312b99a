use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use kursview::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for kursview::AppCommand {
    fn from(cmd: Commands) -> kursview::AppCommand {
        match cmd {
            Commands::Serve => kursview::AppCommand::Serve,
            Commands::SyncCodes => kursview::AppCommand::SyncCodes,
            Commands::SyncRates { start, end } => kursview::AppCommand::SyncRates { start, end },
            Commands::Chart {
                start,
                end,
                countries,
                out,
            } => kursview::AppCommand::Chart {
                start,
                end,
                countries,
                out,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the HTTP server
    Serve,
    /// Sync the country/currency code table and print it
    SyncCodes,
    /// Sync rate snapshots for a date range and recompute changes
    SyncRates {
        /// Start date, DD.MM.YYYY
        #[arg(long)]
        start: String,
        /// End date, DD.MM.YYYY
        #[arg(long)]
        end: String,
    },
    /// Render a relative-change chart for selected countries
    Chart {
        /// Start date, DD.MM.YYYY
        #[arg(long)]
        start: String,
        /// End date, DD.MM.YYYY
        #[arg(long)]
        end: String,
        /// Country name as listed in the code table; repeatable
        #[arg(long = "country", required = true)]
        countries: Vec<String>,
        /// Output file for the rendered SVG
        #[arg(long, default_value = "chart.svg")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => kursview::cli::setup::setup(),
        Some(cmd) => kursview::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
