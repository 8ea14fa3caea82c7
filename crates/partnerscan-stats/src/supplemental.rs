//! Summaries that do not group by a single dimension: rate distribution,
//! installment milestones, contact completeness and source filtering.
//!
//! They return [`SummaryRow`]s so every table shares one output shape.

use partnerscan_core::PartnerRecord;

use crate::summary::{percent, SummaryRow};

/// Installment lengths reported by [`installment_coverage`] by default.
pub const DEFAULT_MILESTONES: [u32; 4] = [3, 6, 12, 24];

/// Number of records at each distinct cashback rate, rate ascending.
///
/// Percentages are shares of the records that have a rate; the mean and
/// max columns repeat the rate itself.
#[must_use]
pub fn cashback_distribution(records: &[PartnerRecord]) -> Vec<SummaryRow> {
    let mut rates: Vec<f64> = records
        .iter()
        .filter_map(PartnerRecord::cashback_rate)
        .collect();
    if rates.is_empty() {
        return Vec::new();
    }
    rates.sort_by(f64::total_cmp);

    let rated = rates.len();
    let mut rows: Vec<SummaryRow> = Vec::new();
    for rate in rates {
        match rows.last_mut() {
            Some(row) if row.max_cashback.is_some_and(|r| r.total_cmp(&rate).is_eq()) => {
                row.count += 1;
            }
            _ => rows.push(SummaryRow {
                dimension: "cashback_rate".to_owned(),
                value: format!("{rate:.1}%"),
                count: 1,
                percentage: 0.0,
                mean_cashback: Some(rate),
                max_cashback: Some(rate),
            }),
        }
    }
    for row in &mut rows {
        row.percentage = percent(row.count, rated);
    }
    rows
}

/// How many records offer each of `milestones` (in months), in the given
/// order, as a share of all records.
///
/// One record can count toward several milestones, so percentages do not
/// sum to 100.
#[must_use]
pub fn installment_coverage(records: &[PartnerRecord], milestones: &[u32]) -> Vec<SummaryRow> {
    if records.is_empty() {
        return Vec::new();
    }
    milestones
        .iter()
        .map(|months| {
            let offering: Vec<&PartnerRecord> = records
                .iter()
                .filter(|r| r.installment_terms().contains(months))
                .collect();
            let (mean_cashback, max_cashback) = cashback_stats(&offering);
            SummaryRow {
                dimension: "installment_term".to_owned(),
                value: format!("{months} months"),
                count: offering.len(),
                percentage: percent(offering.len(), records.len()),
                mean_cashback,
                max_cashback,
            }
        })
        .collect()
}

/// Records split by which contact details they carry: phone and address,
/// phone only, address only, neither. Always four rows in that order for a
/// non-empty input.
#[must_use]
pub fn completeness(records: &[PartnerRecord]) -> Vec<SummaryRow> {
    if records.is_empty() {
        return Vec::new();
    }
    let classes: [(&str, fn(&PartnerRecord) -> bool); 4] = [
        ("phone and address", |r| r.phone().is_some() && r.address().is_some()),
        ("phone only", |r| r.phone().is_some() && r.address().is_none()),
        ("address only", |r| r.phone().is_none() && r.address().is_some()),
        ("neither", |r| r.phone().is_none() && r.address().is_none()),
    ];
    classes
        .into_iter()
        .map(|(label, is_member)| {
            let members: Vec<&PartnerRecord> = records.iter().filter(|r| is_member(r)).collect();
            let (mean_cashback, max_cashback) = cashback_stats(&members);
            SummaryRow {
                dimension: "completeness".to_owned(),
                value: label.to_owned(),
                count: members.len(),
                percentage: percent(members.len(), records.len()),
                mean_cashback,
                max_cashback,
            }
        })
        .collect()
}

/// Records of one source, matched case-insensitively.
#[must_use]
pub fn filter_source(records: &[PartnerRecord], source: &str) -> Vec<PartnerRecord> {
    records
        .iter()
        .filter(|r| r.source().eq_ignore_ascii_case(source))
        .cloned()
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn cashback_stats(records: &[&PartnerRecord]) -> (Option<f64>, Option<f64>) {
    let rates: Vec<f64> = records.iter().filter_map(|r| r.cashback_rate()).collect();
    if rates.is_empty() {
        return (None, None);
    }
    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    let max = rates.iter().copied().fold(f64::MIN, f64::max);
    (Some(mean), Some(max))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use partnerscan_core::NewPartnerRecord;

    use super::*;

    fn record(
        source: &str,
        cashback: Option<f64>,
        terms: &[u32],
        phone: bool,
        address: bool,
    ) -> PartnerRecord {
        PartnerRecord::new(NewPartnerRecord {
            source: source.to_owned(),
            name: "Partner".to_owned(),
            phone: phone.then(|| "994501234567".to_owned()),
            address: address.then(|| "Bakı".to_owned()),
            cashback_rate: cashback,
            installment_terms: terms.iter().copied().collect::<BTreeSet<_>>(),
            ..NewPartnerRecord::default()
        })
        .unwrap()
    }

    #[test]
    fn distribution_is_sorted_by_rate() {
        let records = vec![
            record("bolkart", Some(5.0), &[], false, false),
            record("bolkart", Some(2.5), &[], false, false),
            record("bolkart", Some(5.0), &[], false, false),
            record("bolkart", None, &[3], false, false),
        ];
        let rows = cashback_distribution(&records);
        let pairs: Vec<(&str, usize, f64)> = rows
            .iter()
            .map(|r| (r.value.as_str(), r.count, r.percentage))
            .collect();
        assert_eq!(pairs, vec![("2.5%", 1, 33.3), ("5.0%", 2, 66.7)]);
    }

    #[test]
    fn coverage_counts_each_milestone() {
        let records = vec![
            record("tamkart", None, &[3, 6, 12], false, false),
            record("tamkart", Some(2.0), &[3, 24], false, false),
            record("tamkart", None, &[], false, false),
            record("tamkart", None, &[18], false, false),
        ];
        let rows = installment_coverage(&records, &DEFAULT_MILESTONES);
        let counts: Vec<(&str, usize, f64)> = rows
            .iter()
            .map(|r| (r.value.as_str(), r.count, r.percentage))
            .collect();
        assert_eq!(
            counts,
            vec![
                ("3 months", 2, 50.0),
                ("6 months", 1, 25.0),
                ("12 months", 1, 25.0),
                ("24 months", 1, 25.0),
            ]
        );
        assert_eq!(rows[3].max_cashback, Some(2.0));
    }

    #[test]
    fn completeness_classes_partition_records() {
        let records = vec![
            record("xalqbank", None, &[], true, true),
            record("xalqbank", None, &[], true, true),
            record("xalqbank", None, &[], true, false),
            record("xalqbank", None, &[], false, true),
            record("xalqbank", None, &[], false, false),
        ];
        let rows = completeness(&records);
        let counts: Vec<usize> = rows.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
        assert_eq!(counts.iter().sum::<usize>(), records.len());
        assert!((rows[0].percentage - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn filter_source_ignores_case() {
        let records = vec![
            record("Unibank", None, &[], false, false),
            record("bolkart", None, &[], false, false),
        ];
        assert_eq!(filter_source(&records, "unibank").len(), 1);
        assert!(filter_source(&records, "birbank").is_empty());
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        assert!(cashback_distribution(&[]).is_empty());
        assert!(installment_coverage(&[], &DEFAULT_MILESTONES).is_empty());
        assert!(completeness(&[]).is_empty());
    }
}
