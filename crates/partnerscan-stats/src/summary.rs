//! Grouped summary tables.
//!
//! Every function here is pure: the same records always give the same rows
//! in the same order.

use std::collections::HashMap;

use partnerscan_core::PartnerRecord;
use serde::Serialize;

use crate::dimension::Dimension;

/// Separator between the two keys of a cross-dimension bucket.
pub const CROSS_KEY_SEPARATOR: &str = " | ";

/// One bucket of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Dimension label, e.g. `location` or `source x reward_type`.
    pub dimension: String,
    pub value: String,
    pub count: usize,
    /// Share of the summarized records, rounded to one decimal.
    pub percentage: f64,
    /// Mean over the bucket's records that have a cashback rate.
    pub mean_cashback: Option<f64>,
    pub max_cashback: Option<f64>,
}

#[derive(Default)]
struct Bucket {
    count: usize,
    rated: usize,
    rate_sum: f64,
    rate_max: Option<f64>,
}

impl Bucket {
    fn add(&mut self, record: &PartnerRecord) {
        self.count += 1;
        if let Some(rate) = record.cashback_rate() {
            self.rated += 1;
            self.rate_sum += rate;
            self.rate_max = Some(self.rate_max.map_or(rate, |m| m.max(rate)));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> Option<f64> {
        (self.rated > 0).then(|| self.rate_sum / self.rated as f64)
    }
}

/// `part` as a percentage of `total`, rounded to one decimal. Callers
/// guarantee `total > 0`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn percent(part: usize, total: usize) -> f64 {
    round1(part as f64 * 100.0 / total as f64)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Groups `records` by `key` and builds the sorted table.
fn tabulate<F>(records: &[PartnerRecord], dimension: &str, key: F) -> Vec<SummaryRow>
where
    F: Fn(&PartnerRecord) -> String,
{
    if records.is_empty() {
        return Vec::new();
    }

    let mut buckets: HashMap<String, Bucket> = HashMap::new();
    for record in records {
        buckets.entry(key(record)).or_default().add(record);
    }

    let total = records.len();
    let mut rows: Vec<SummaryRow> = buckets
        .into_iter()
        .map(|(value, bucket)| SummaryRow {
            dimension: dimension.to_owned(),
            percentage: percent(bucket.count, total),
            mean_cashback: bucket.mean(),
            max_cashback: bucket.rate_max,
            count: bucket.count,
            value,
        })
        .collect();
    sort_rows(&mut rows);
    rows
}

/// Count descending, then value ascending.
pub(crate) fn sort_rows(rows: &mut [SummaryRow]) {
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
}

/// Summarizes `records` by one dimension.
///
/// Each distinct value gets its count, its share of all records and the
/// mean and max cashback of the records in it that have a rate. An empty
/// input gives an empty table.
#[must_use]
pub fn summarize(records: &[PartnerRecord], dimension: Dimension) -> Vec<SummaryRow> {
    tabulate(records, dimension.as_str(), |r| dimension.key(r))
}

/// Summarizes `records` by the pair of two dimensions.
///
/// Values are written `"<a> | <b>"` and the dimension label is
/// `"<a> x <b>"`.
#[must_use]
pub fn cross(records: &[PartnerRecord], a: Dimension, b: Dimension) -> Vec<SummaryRow> {
    let label = format!("{a} x {b}");
    tabulate(records, &label, |r| {
        format!("{}{CROSS_KEY_SEPARATOR}{}", a.key(r), b.key(r))
    })
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
