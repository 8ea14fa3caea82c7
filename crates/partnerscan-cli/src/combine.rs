//! `combine` command handler.

use std::path::{Path, PathBuf};

use anyhow::Context;
use partnerscan_table::Combined;

/// Merge per-source tables into `output`, dropping duplicates within each
/// source. Inputs are concatenated in the order given.
///
/// # Errors
///
/// Returns an error if any input cannot be loaded or the output cannot be
/// written.
pub(crate) fn run_combine(inputs: &[PathBuf], output: &Path) -> anyhow::Result<()> {
    let mut tables = Vec::with_capacity(inputs.len());
    for input in inputs {
        let records = partnerscan_table::load(input)
            .with_context(|| format!("failed to load {}", input.display()))?;
        tables.push(records);
    }

    let Combined {
        records,
        duplicates_dropped,
    } = partnerscan_table::combine(tables);

    partnerscan_table::save(output, &records)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "combined {} records from {} tables into {} ({duplicates_dropped} duplicates dropped)",
        records.len(),
        inputs.len(),
        output.display()
    );
    Ok(())
}
