use std::fmt::Write as _;

use partnerscan_stats::Overview;
use serde::Serialize;

use super::Table;

const CSV_HEADER: [&str; 6] = [
    "dimension",
    "value",
    "count",
    "percentage",
    "mean_cashback",
    "max_cashback",
];

/// Markdown document: the overview, then one section per table.
pub(super) fn markdown(overview: &Overview, tables: &[Table]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_markdown(&mut out, overview, tables);
    out
}

fn write_markdown(out: &mut String, overview: &Overview, tables: &[Table]) -> std::fmt::Result {
    writeln!(out, "# Partner Summary")?;
    writeln!(out)?;
    writeln!(out, "- Records: {}", overview.total)?;
    writeln!(out, "- Locations: {}", overview.unique_locations)?;
    if let Some((location, count)) = &overview.top_location {
        writeln!(out, "- Top location: {location} ({count})")?;
    }
    if let Some(share) = overview.phone_share {
        writeln!(out, "- With phone: {} ({share:.1}%)", overview.with_phone)?;
    }
    if let Some(share) = overview.cashback_share {
        writeln!(out, "- With cashback: {} ({share:.1}%)", overview.with_cashback)?;
    }

    for table in tables {
        writeln!(out)?;
        writeln!(out, "## {}", table.title)?;
        writeln!(out)?;
        if table.rows.is_empty() {
            writeln!(out, "_no records_")?;
            continue;
        }
        writeln!(out, "| value | count | % | mean cashback | max cashback |")?;
        writeln!(out, "|---|---:|---:|---:|---:|")?;
        for row in &table.rows {
            writeln!(
                out,
                "| {} | {} | {:.1} | {} | {} |",
                escape_cell(&row.value),
                row.count,
                row.percentage,
                fmt_rate(row.mean_cashback),
                fmt_rate(row.max_cashback),
            )?;
        }
    }
    Ok(())
}

/// Flat CSV of every row; the `dimension` column tells tables apart.
pub(super) fn csv(tables: &[Table]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for row in tables.iter().flat_map(|t| &t.rows) {
        wtr.serialize(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Serialize)]
struct Document<'a> {
    overview: &'a Overview,
    tables: &'a [Table],
}

pub(super) fn json(overview: &Overview, tables: &[Table]) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(&Document { overview, tables })?;
    out.push('\n');
    Ok(out)
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "-".to_owned(), |r| format!("{r:.2}"))
}

/// Cross keys contain `|`, which would split a markdown cell.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
