//! Flat CSV persistence of partner records.
//!
//! One row per record. Empty cells are nulls, installment terms are
//! `;`-joined, and columns are located by header name so extra columns
//! (for example spreadsheet annotations) are ignored on read.

use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::Path;

use partnerscan_core::{NewPartnerRecord, PartnerRecord, PopularityTier, RewardType};

use crate::error::TableError;

/// Column order of a written table.
pub const COLUMNS: [&str; 11] = [
    "source",
    "name",
    "phone",
    "address",
    "location",
    "category",
    "reward_type",
    "cashback_rate",
    "miles_rate",
    "installment_terms",
    "popularity_tier",
];

const TERM_SEPARATOR: char = ';';

// Indexes into `COLUMNS`.
const SOURCE: usize = 0;
const NAME: usize = 1;
const PHONE: usize = 2;
const ADDRESS: usize = 3;
const LOCATION: usize = 4;
const CATEGORY: usize = 5;
const REWARD_TYPE: usize = 6;
const CASHBACK_RATE: usize = 7;
const MILES_RATE: usize = 8;
const INSTALLMENT_TERMS: usize = 9;
const POPULARITY_TIER: usize = 10;

/// Writes `records` with a header row.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if writing fails.
pub fn write_records<W: io::Write>(
    writer: W,
    records: &[PartnerRecord],
) -> Result<(), TableError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;

    for record in records {
        let terms = record
            .installment_terms()
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(&TERM_SEPARATOR.to_string());
        let cashback = record.cashback_rate().map(|r| r.to_string()).unwrap_or_default();
        let miles = record.miles_rate().map(|r| r.to_string()).unwrap_or_default();
        wtr.write_record([
            record.source(),
            record.name(),
            record.phone().unwrap_or_default(),
            record.address().unwrap_or_default(),
            record.location(),
            record.category().unwrap_or_default(),
            record.reward_type().as_str(),
            cashback.as_str(),
            miles.as_str(),
            terms.as_str(),
            record.popularity_tier().map(PopularityTier::as_str).unwrap_or_default(),
        ])?;
    }

    wtr.flush().map_err(|e| TableError::Csv(e.into()))?;
    Ok(())
}

/// Column positions resolved from the header row.
struct Layout {
    positions: [usize; COLUMNS.len()],
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, TableError> {
        let mut positions = [0usize; COLUMNS.len()];
        for (slot, column) in positions.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| TableError::SchemaMismatch {
                    column: column.to_owned(),
                })?;
        }
        Ok(Self { positions })
    }

    fn get<'r>(&self, row: &'r csv::StringRecord, column: usize) -> Option<&'r str> {
        row.get(self.positions[column])
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Reads a table written by [`write_records`] (or edited by hand).
///
/// # Errors
///
/// - [`TableError::SchemaMismatch`] naming the first required column the
///   header lacks.
/// - [`TableError::InvalidRow`] for a row that cannot form a valid record,
///   including one whose `reward_type` contradicts its rates and terms.
/// - [`TableError::Csv`] for malformed CSV.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<PartnerRecord>, TableError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let layout = Layout::from_headers(rdr.headers()?)?;
    let mut records = Vec::new();

    for row in rdr.records() {
        let row = row?;
        let line = row.position().map_or(0, csv::Position::line);
        let record =
            parse_row(&layout, &row).map_err(|reason| TableError::InvalidRow { line, reason })?;
        records.push(record);
    }

    Ok(records)
}

fn parse_row(layout: &Layout, row: &csv::StringRecord) -> Result<PartnerRecord, String> {
    let cell = |column: usize| layout.get(row, column);
    let owned = |column: usize| cell(column).map(str::to_owned);

    let rate = |column: usize| -> Result<Option<f64>, String> {
        cell(column)
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| format!("{} '{v}' is not a number", COLUMNS[column]))
            })
            .transpose()
    };

    let installment_terms = cell(INSTALLMENT_TERMS)
        .unwrap_or_default()
        .split(TERM_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<u32>()
                .map_err(|_| format!("installment term '{t}' is not a whole number of months"))
        })
        .collect::<Result<BTreeSet<u32>, String>>()?;

    let popularity_tier = cell(POPULARITY_TIER)
        .map(|v| PopularityTier::parse(v).ok_or_else(|| format!("unknown popularity tier '{v}'")))
        .transpose()?;

    let stated = cell(REWARD_TYPE)
        .ok_or_else(|| "reward_type is empty".to_owned())
        .and_then(|v| RewardType::parse(v).ok_or_else(|| format!("unknown reward type '{v}'")))?;

    let record = PartnerRecord::new(NewPartnerRecord {
        source: owned(SOURCE).unwrap_or_default(),
        name: owned(NAME).unwrap_or_default(),
        phone: owned(PHONE),
        address: owned(ADDRESS),
        location: owned(LOCATION),
        category: owned(CATEGORY),
        cashback_rate: rate(CASHBACK_RATE)?,
        miles_rate: rate(MILES_RATE)?,
        installment_terms,
        popularity_tier,
    })
    .map_err(|e| e.to_string())?;

    if record.reward_type() != stated {
        return Err(format!(
            "reward_type '{stated}' does not match the row's rates and terms (expected '{}')",
            record.reward_type()
        ));
    }

    Ok(record)
}

/// Writes `records` to `path`, creating parent directories. A re-scrape
/// replaces the whole file.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the file cannot be created, or
/// [`TableError::Csv`] if writing fails.
pub fn save(path: &Path, records: &[PartnerRecord]) -> Result<(), TableError> {
    let io_err = |source: io::Error| TableError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    write_records(file, records)?;
    tracing::info!(path = %path.display(), records = records.len(), "table written");
    Ok(())
}

/// Reads the table at `path`.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the file cannot be opened, otherwise as
/// [`read_records`].
pub fn load(path: &Path) -> Result<Vec<PartnerRecord>, TableError> {
    let file = File::open(path).map_err(|source| TableError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let records = read_records(file)?;
    tracing::debug!(path = %path.display(), records = records.len(), "table loaded");
    Ok(records)
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
