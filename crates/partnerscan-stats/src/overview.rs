use std::collections::HashSet;

use partnerscan_core::{PartnerRecord, RewardType, UNKNOWN_LOCATION};
use serde::Serialize;

use crate::dimension::Dimension;
use crate::summary::{percent, summarize};

/// Headline numbers for a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total: usize,
    /// Distinct known locations; `Unknown` is not counted.
    pub unique_locations: usize,
    /// Most common known location and its count.
    pub top_location: Option<(String, usize)>,
    pub with_phone: usize,
    /// Share of records with a phone, rounded to one decimal. `None` when
    /// there are no records.
    pub phone_share: Option<f64>,
    pub with_cashback: usize,
    pub cashback_share: Option<f64>,
}

impl Overview {
    #[must_use]
    pub fn of(records: &[PartnerRecord]) -> Self {
        let total = records.len();
        let known = |location: &str| location != UNKNOWN_LOCATION;

        let unique_locations = records
            .iter()
            .map(PartnerRecord::location)
            .filter(|l| known(l))
            .collect::<HashSet<_>>()
            .len();

        let top_location = summarize(records, Dimension::Location)
            .into_iter()
            .find(|row| known(&row.value))
            .map(|row| (row.value, row.count));

        let with_phone = records.iter().filter(|r| r.phone().is_some()).count();
        let with_cashback = records
            .iter()
            .filter(|r| r.reward_type() == RewardType::Cashback)
            .count();
        let share = |part: usize| (total > 0).then(|| percent(part, total));

        Self {
            total,
            unique_locations,
            top_location,
            with_phone,
            phone_share: share(with_phone),
            with_cashback,
            cashback_share: share(with_cashback),
        }
    }
}
