//! Merging per-source tables into one collection.

use std::collections::HashSet;

use partnerscan_core::PartnerRecord;

#[derive(Debug, Default)]
pub struct Combined {
    pub records: Vec<PartnerRecord>,
    /// Rows dropped because their source already had the same name+address.
    pub duplicates_dropped: usize,
}

/// Concatenates `tables` in order, keeping the first row for each
/// (source, name, address) and dropping later repeats.
///
/// Matching ignores case. Identical partners listed by different sources
/// are all kept, since each bank's terms are reported separately.
#[must_use]
pub fn combine<I>(tables: I) -> Combined
where
    I: IntoIterator<Item = Vec<PartnerRecord>>,
{
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut out = Combined::default();

    for record in tables.into_iter().flatten() {
        let (name, address) = record.dedup_key();
        if seen.insert((record.source().to_lowercase(), name, address)) {
            out.records.push(record);
        } else {
            tracing::debug!(
                source = record.source(),
                name = record.name(),
                "dropping duplicate partner"
            );
            out.duplicates_dropped += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use partnerscan_core::NewPartnerRecord;

    use super::*;

    fn record(source: &str, name: &str, address: Option<&str>) -> PartnerRecord {
        PartnerRecord::new(NewPartnerRecord {
            source: source.to_owned(),
            name: name.to_owned(),
            address: address.map(str::to_owned),
            ..NewPartnerRecord::default()
        })
        .unwrap()
    }

    #[test]
    fn drops_repeats_within_a_source() {
        let first = vec![
            record("unibank", "Zara", Some("28 Mall")),
            record("unibank", "Mango", Some("Gənclik Mall")),
        ];
        let second = vec![
            record("unibank", "ZARA", Some("28 mall")),
            record("unibank", "Zara", Some("Park Bulvar")),
        ];
        let combined = combine([first, second]);
        let names: Vec<(&str, Option<&str>)> = combined
            .records
            .iter()
            .map(|r| (r.name(), r.address()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Zara", Some("28 Mall")),
                ("Mango", Some("Gənclik Mall")),
                ("Zara", Some("Park Bulvar")),
            ]
        );
        assert_eq!(combined.duplicates_dropped, 1);
    }

    #[test]
    fn keeps_same_partner_from_different_sources() {
        let combined = combine([
            vec![record("unibank", "Bravo", None)],
            vec![record("bolkart", "Bravo", None)],
        ]);
        assert_eq!(combined.records.len(), 2);
        assert_eq!(combined.duplicates_dropped, 0);
    }

    #[test]
    fn missing_address_counts_as_empty() {
        let combined = combine([vec![
            record("pashabank", "AZAL", None),
            record("pashabank", "azal", Some("  ")),
        ]]);
        assert_eq!(combined.records.len(), 1);
    }

    #[test]
    fn empty_input() {
        let combined = combine(Vec::<Vec<PartnerRecord>>::new());
        assert!(combined.records.is_empty());
    }
}
