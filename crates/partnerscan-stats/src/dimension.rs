use std::str::FromStr;

use partnerscan_core::{region_of, PartnerRecord, PopularityTier, UNKNOWN_LOCATION};
use serde::Serialize;
use thiserror::Error;

/// Bucket for records with no value in the grouped field.
pub const UNKNOWN: &str = UNKNOWN_LOCATION;

/// A field records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Location,
    Category,
    RewardType,
    PopularityTier,
    Source,
    /// Location collapsed to the major cities plus "Other Regions".
    Region,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "unknown dimension '{0}' (expected location, category, reward_type, popularity_tier, source or region)"
)]
pub struct UnknownDimension(pub String);

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Location,
        Dimension::Category,
        Dimension::RewardType,
        Dimension::PopularityTier,
        Dimension::Source,
        Dimension::Region,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Location => "location",
            Dimension::Category => "category",
            Dimension::RewardType => "reward_type",
            Dimension::PopularityTier => "popularity_tier",
            Dimension::Source => "source",
            Dimension::Region => "region",
        }
    }

    /// The bucket `record` falls into. Missing values map to [`UNKNOWN`],
    /// except reward type which is always present (`NoData` included).
    #[must_use]
    pub fn key(self, record: &PartnerRecord) -> String {
        let value = match self {
            Dimension::Location => Some(record.location()),
            Dimension::Category => record.category(),
            Dimension::RewardType => Some(record.reward_type().label()),
            Dimension::PopularityTier => record.popularity_tier().map(PopularityTier::label),
            Dimension::Source => Some(record.source()).filter(|s| !s.is_empty()),
            Dimension::Region => Some(region_of(record.location())),
        };
        value.unwrap_or(UNKNOWN).to_owned()
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "location" | "city" => Ok(Dimension::Location),
            "category" => Ok(Dimension::Category),
            "reward_type" | "reward" => Ok(Dimension::RewardType),
            "popularity_tier" | "popularity" | "tier" => Ok(Dimension::PopularityTier),
            "source" | "bank" => Ok(Dimension::Source),
            "region" => Ok(Dimension::Region),
            _ => Err(UnknownDimension(s.to_owned())),
        }
    }
}
