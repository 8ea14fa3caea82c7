//! `scrape` command handler.
//!
//! Sources run one after another. A source that cannot be scraped at all is
//! logged and skipped so the remaining sources still produce their tables;
//! the run fails only when every selected source failed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use partnerscan_core::{AppConfig, SourceConfig, SourcesFile};
use partnerscan_scraper::{CrawlOptions, ListingClient, ScrapeReport};

#[derive(Debug)]
pub(crate) struct ScrapeArgs {
    pub source: Option<String>,
    pub output: Option<PathBuf>,
    pub max_pages: Option<usize>,
    pub pipeline: bool,
    pub sources: Option<PathBuf>,
    pub dry_run: bool,
}

/// Picks the sources for this run. A named source must exist.
pub(crate) fn select_sources<'a>(
    file: &'a SourcesFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<&'a SourceConfig>> {
    match filter {
        Some(name) => {
            let source = file.find(name).ok_or_else(|| {
                let known: Vec<&str> = file.sources.iter().map(|s| s.name.as_str()).collect();
                anyhow::anyhow!(
                    "source '{name}' is not configured (known: {})",
                    known.join(", ")
                )
            })?;
            Ok(vec![source])
        }
        None => Ok(file.sources.iter().collect()),
    }
}

/// Where a source's table goes: the explicit output, else
/// `<data_dir>/<source>.csv`.
pub(crate) fn table_path(data_dir: &Path, output: Option<&Path>, source: &str) -> PathBuf {
    output.map_or_else(
        || data_dir.join(format!("{source}.csv")),
        Path::to_path_buf,
    )
}

/// Scrape the selected sources and write one table per source.
///
/// # Errors
///
/// Returns an error if the sources file cannot be loaded, the source filter
/// matches nothing, `--output` is combined with several sources, the HTTP
/// client cannot be built, a table cannot be written, or no source could be
/// scraped.
pub(crate) async fn run_scrape(config: &AppConfig, args: ScrapeArgs) -> anyhow::Result<()> {
    let sources_path = args.sources.as_deref().unwrap_or(&config.sources_path);
    let sources_file = partnerscan_core::load_sources(sources_path)
        .with_context(|| format!("failed to load sources from {}", sources_path.display()))?;
    let selected = select_sources(&sources_file, args.source.as_deref())?;

    if args.output.is_some() && selected.len() > 1 {
        anyhow::bail!("--output needs --source when more than one source is configured");
    }

    if args.dry_run {
        println!("dry-run: would scrape {} sources:", selected.len());
        for source in &selected {
            let path = table_path(&config.data_dir, args.output.as_deref(), &source.name);
            println!("  {} <- {} -> {}", source.name, source.url, path.display());
        }
        return Ok(());
    }

    let client = ListingClient::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_ms,
    )
    .context("failed to build HTTP client")?;

    let options = CrawlOptions {
        max_pages: args.max_pages.unwrap_or(config.scraper_max_pages),
        inter_request_delay_ms: config.scraper_inter_request_delay_ms,
        pipeline: args.pipeline || config.scraper_pipeline_fetches,
    };

    let mut reports: Vec<ScrapeReport> = Vec::with_capacity(selected.len());
    let mut failed_sources: Vec<&str> = Vec::new();

    for source in &selected {
        let outcome = match partnerscan_scraper::scrape_source(&client, source, &options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(source = %source.name, error = %e, "source could not be scraped");
                eprintln!("error: failed to scrape {}: {e}", source.name);
                failed_sources.push(&source.name);
                continue;
            }
        };

        let path = table_path(&config.data_dir, args.output.as_deref(), &source.name);
        partnerscan_table::save(&path, &outcome.records)
            .with_context(|| format!("failed to write table for {}", source.name))?;
        reports.push(outcome.report);
    }

    print_summary(&reports);

    if !failed_sources.is_empty() {
        eprintln!(
            "warning: {} of {} sources failed: [{}]",
            failed_sources.len(),
            selected.len(),
            failed_sources.join(", ")
        );
    }
    if reports.is_empty() {
        anyhow::bail!("no source could be scraped");
    }
    Ok(())
}

fn print_summary(reports: &[ScrapeReport]) {
    let Some((first, rest)) = reports.split_first() else {
        return;
    };

    println!(
        "{:<18}{:>9}{:>9}{:>7}{:>8}{:>9}  NOTES",
        "SOURCE", "RECORDS", "SKIPPED", "PAGES", "FAILED", "SECONDS"
    );
    for report in reports {
        print_row(&report.source, report);
    }

    let mut total = first.clone();
    for report in rest {
        total.absorb(report);
    }
    print_row("total", &total);
}

fn print_row(label: &str, report: &ScrapeReport) {
    let elapsed = (report.finished_at - report.started_at).num_milliseconds();
    let mut notes: Vec<&str> = Vec::new();
    if report.hit_page_limit {
        notes.push("page limit reached");
    }
    if report.cycle_detected {
        notes.push("pagination cycle");
    }
    println!(
        "{:<18}{:>9}{:>9}{:>7}{:>8}{:>9}  {}",
        label,
        report.records_extracted,
        report.entries_skipped,
        report.pages_fetched,
        report.pages_failed,
        format_seconds(elapsed),
        notes.join(", ")
    );
}

#[allow(clippy::cast_precision_loss)]
fn format_seconds(millis: i64) -> String {
    format!("{:.1}", millis as f64 / 1000.0)
}
