//! `report` command handler.
//!
//! Loads a table, builds the requested summary tables and renders them as
//! markdown, CSV or JSON.

mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::ValueEnum;
use partnerscan_core::PartnerRecord;
use partnerscan_stats::{Dimension, Overview, SummaryRow, DEFAULT_MILESTONES};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown tables
    Table,
    Csv,
    Json,
}

/// Two dimensions to summarize together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossPair(pub Dimension, pub Dimension);

/// Parses `a,b` (or `a:b`) into a [`CrossPair`].
pub(crate) fn parse_cross(raw: &str) -> Result<CrossPair, String> {
    let (a, b) = raw
        .split_once([',', ':'])
        .ok_or_else(|| format!("expected two dimensions like 'source,reward_type', got '{raw}'"))?;
    let a: Dimension = a.parse().map_err(|e| format!("{e}"))?;
    let b: Dimension = b.parse().map_err(|e| format!("{e}"))?;
    if a == b {
        return Err(format!("cannot cross '{a}' with itself"));
    }
    Ok(CrossPair(a, b))
}

/// One titled summary table.
#[derive(Debug, Serialize)]
pub(crate) struct Table {
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug)]
pub(crate) struct ReportArgs {
    pub input: PathBuf,
    pub dimensions: Vec<Dimension>,
    pub crosses: Vec<CrossPair>,
    pub source: Option<String>,
    pub milestones: Vec<u32>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Builds the tables for `records`.
///
/// With no dimensions and no crosses requested, every dimension is
/// summarized and the rate distribution, installment coverage and contact
/// completeness tables follow.
pub(crate) fn build_tables(
    records: &[PartnerRecord],
    dimensions: &[Dimension],
    crosses: &[CrossPair],
    milestones: &[u32],
) -> Vec<Table> {
    let everything = dimensions.is_empty() && crosses.is_empty();
    let dimensions: &[Dimension] = if everything {
        &Dimension::ALL
    } else {
        dimensions
    };

    let mut tables: Vec<Table> = dimensions
        .iter()
        .map(|&dim| Table {
            title: dim.to_string(),
            rows: partnerscan_stats::summarize(records, dim),
        })
        .collect();

    tables.extend(crosses.iter().map(|&CrossPair(a, b)| Table {
        title: format!("{a} x {b}"),
        rows: partnerscan_stats::cross(records, a, b),
    }));

    if everything {
        let milestones = if milestones.is_empty() {
            &DEFAULT_MILESTONES[..]
        } else {
            milestones
        };
        tables.push(Table {
            title: "cashback distribution".to_owned(),
            rows: partnerscan_stats::cashback_distribution(records),
        });
        tables.push(Table {
            title: "installment coverage".to_owned(),
            rows: partnerscan_stats::installment_coverage(records, milestones),
        });
        tables.push(Table {
            title: "contact completeness".to_owned(),
            rows: partnerscan_stats::completeness(records),
        });
    }
    tables
}

/// Summarize a table and write the report to stdout or `--output`.
///
/// # Errors
///
/// Returns an error if the input cannot be loaded, rendering fails, or the
/// output cannot be written.
pub(crate) fn run_report(args: &ReportArgs) -> anyhow::Result<()> {
    let mut records = partnerscan_table::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    if let Some(source) = args.source.as_deref() {
        records = partnerscan_stats::filter_source(&records, source);
        if records.is_empty() {
            tracing::warn!(source, "no records for source");
        }
    }

    let overview = Overview::of(&records);
    let tables = build_tables(&records, &args.dimensions, &args.crosses, &args.milestones);

    let rendered = match args.format {
        OutputFormat::Table => render::markdown(&overview, &tables),
        OutputFormat::Csv => render::csv(&tables).context("failed to render CSV")?,
        OutputFormat::Json => render::json(&overview, &tables).context("failed to render JSON")?,
    };

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), tables = tables.len(), "report written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
