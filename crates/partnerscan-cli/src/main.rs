mod combine;
mod report;
mod scrape;

use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use partnerscan_stats::Dimension;
use tracing_subscriber::EnvFilter;

use crate::report::{CrossPair, OutputFormat};

#[derive(Debug, Parser)]
#[command(name = "partnerscan")]
#[command(about = "Scrape bank partner-merchant listings and summarize them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape configured sources into per-source tables
    Scrape {
        /// Restrict the run to one source (by name)
        #[arg(long)]
        source: Option<String>,
        /// Table path; only valid when a single source is scraped
        #[arg(long)]
        output: Option<PathBuf>,
        /// Override the pagination ceiling
        #[arg(long)]
        max_pages: Option<usize>,
        /// Fetch the next page while the current one is parsed
        #[arg(long)]
        pipeline: bool,
        /// Sources file to use instead of the configured one
        #[arg(long)]
        sources: Option<PathBuf>,
        /// List what would be scraped without fetching anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Merge per-source tables into one, dropping duplicates
    Combine {
        /// Combined table path (defaults to `<data_dir>/data.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Per-source tables to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Summarize a table by one or more dimensions
    Report {
        /// Table to summarize (defaults to `<data_dir>/data.csv`)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Dimension to group by; repeatable. All dimensions when omitted
        #[arg(long = "dimension", short = 'd')]
        dimensions: Vec<Dimension>,
        /// Pair of dimensions to cross, e.g. `source,reward_type`; repeatable
        #[arg(long = "cross", value_parser = report::parse_cross)]
        crosses: Vec<CrossPair>,
        /// Only summarize records of this source
        #[arg(long)]
        source: Option<String>,
        /// Installment terms (months) for the coverage table
        #[arg(long, value_delimiter = ',')]
        milestones: Vec<u32>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = partnerscan_core::load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Scrape {
            source,
            output,
            max_pages,
            pipeline,
            sources,
            dry_run,
        }) => {
            let args = scrape::ScrapeArgs {
                source,
                output,
                max_pages,
                pipeline,
                sources,
                dry_run,
            };
            scrape::run_scrape(&config, args).await
        }
        Some(Commands::Combine { output, inputs }) => {
            let output = output.unwrap_or_else(|| config.data_dir.join("data.csv"));
            combine::run_combine(&inputs, &output)
        }
        Some(Commands::Report {
            input,
            dimensions,
            crosses,
            source,
            milestones,
            format,
            output,
        }) => {
            let args = report::ReportArgs {
                input: input.unwrap_or_else(|| config.data_dir.join("data.csv")),
                dimensions,
                crosses,
                source,
                milestones,
                format,
                output,
            };
            report::run_report(&args)
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
