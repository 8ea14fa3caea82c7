//! The normalized partner record produced by the extractor and consumed by
//! the aggregator.
//!
//! A [`PartnerRecord`] can only be built through [`PartnerRecord::new`], which
//! derives the reward type and rejects values that would break the record
//! invariants. Fields are read through accessors; there are no setters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gazetteer::UNKNOWN_LOCATION;

/// How a partner rewards card holders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Cashback,
    InstallmentOnly,
    Miles,
    NoData,
}

impl RewardType {
    /// Column value used in the persisted table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RewardType::Cashback => "cashback",
            RewardType::InstallmentOnly => "installment_only",
            RewardType::Miles => "miles",
            RewardType::NoData => "no_data",
        }
    }

    /// Parses the persisted column value. Also accepts the legacy
    /// `taksit_only` / `unknown` spellings.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cashback" => Some(RewardType::Cashback),
            "installment_only" | "taksit_only" => Some(RewardType::InstallmentOnly),
            "miles" => Some(RewardType::Miles),
            "no_data" | "unknown" => Some(RewardType::NoData),
            _ => None,
        }
    }

    /// Human-readable label used in summary tables.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RewardType::Cashback => "Cashback",
            RewardType::InstallmentOnly => "InstallmentOnly",
            RewardType::Miles => "Miles",
            RewardType::NoData => "NoData",
        }
    }
}

impl std::fmt::Display for RewardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source-provided traffic ranking bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopularityTier {
    High,
    Mid,
    Standard,
}

impl PopularityTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PopularityTier::High => "high",
            PopularityTier::Mid => "mid",
            PopularityTier::Standard => "standard",
        }
    }

    /// Accepts the numeric tiers (`1`, `2`, `3`) some sources expose as well
    /// as the tier words, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "1" | "high" => Some(PopularityTier::High),
            "2" | "mid" | "medium" => Some(PopularityTier::Mid),
            "3" | "standard" => Some(PopularityTier::Standard),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PopularityTier::High => "High",
            PopularityTier::Mid => "Mid",
            PopularityTier::Standard => "Standard",
        }
    }
}

impl std::fmt::Display for PopularityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("partner name must be non-empty")]
    EmptyName,

    #[error("cashback rate {rate} for '{name}' is outside (0, 100]")]
    CashbackOutOfRange { name: String, rate: f64 },

    #[error("miles rate {rate} for '{name}' must be positive")]
    MilesNotPositive { name: String, rate: f64 },
}

/// Field values for a record that has not been validated yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPartnerRecord {
    pub source: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// `None` is stored as [`UNKNOWN_LOCATION`].
    pub location: Option<String>,
    pub category: Option<String>,
    pub cashback_rate: Option<f64>,
    pub miles_rate: Option<f64>,
    pub installment_terms: BTreeSet<u32>,
    pub popularity_tier: Option<PopularityTier>,
}

/// One scraped partner merchant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerRecord {
    source: String,
    name: String,
    phone: Option<String>,
    address: Option<String>,
    location: String,
    category: Option<String>,
    reward_type: RewardType,
    cashback_rate: Option<f64>,
    miles_rate: Option<f64>,
    installment_terms: BTreeSet<u32>,
    popularity_tier: Option<PopularityTier>,
}

impl PartnerRecord {
    /// Validates `fields` and derives the reward type.
    ///
    /// Cashback wins over miles, miles over installments; a record with none
    /// of the three is [`RewardType::NoData`]. Blank optional strings are
    /// stored as `None`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::EmptyName`] when the trimmed name is empty.
    /// - [`RecordError::CashbackOutOfRange`] when a cashback rate is outside `(0, 100]`.
    /// - [`RecordError::MilesNotPositive`] when a miles rate is zero or negative.
    pub fn new(fields: NewPartnerRecord) -> Result<Self, RecordError> {
        let name = fields.name.trim().to_owned();
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }

        if let Some(rate) = fields.cashback_rate {
            if !is_valid_cashback(rate) {
                return Err(RecordError::CashbackOutOfRange { name, rate });
            }
        }
        if let Some(rate) = fields.miles_rate {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(RecordError::MilesNotPositive { name, rate });
            }
        }

        let reward_type = derive_reward_type(
            fields.cashback_rate,
            fields.miles_rate,
            &fields.installment_terms,
        );

        Ok(Self {
            source: fields.source.trim().to_owned(),
            name,
            phone: non_blank(fields.phone),
            address: non_blank(fields.address),
            location: non_blank(fields.location).unwrap_or_else(|| UNKNOWN_LOCATION.to_owned()),
            category: non_blank(fields.category),
            reward_type,
            cashback_rate: fields.cashback_rate,
            miles_rate: fields.miles_rate,
            installment_terms: fields.installment_terms,
            popularity_tier: fields.popularity_tier,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn reward_type(&self) -> RewardType {
        self.reward_type
    }

    #[must_use]
    pub fn cashback_rate(&self) -> Option<f64> {
        self.cashback_rate
    }

    #[must_use]
    pub fn miles_rate(&self) -> Option<f64> {
        self.miles_rate
    }

    #[must_use]
    pub fn installment_terms(&self) -> &BTreeSet<u32> {
        &self.installment_terms
    }

    #[must_use]
    pub fn popularity_tier(&self) -> Option<PopularityTier> {
        self.popularity_tier
    }

    /// Key used for manual deduplication across runs: lowercased name plus
    /// lowercased address.
    #[must_use]
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.name.to_lowercase(),
            self.address.as_deref().unwrap_or_default().to_lowercase(),
        )
    }
}

/// `true` when `rate` is a usable cashback percentage, i.e. in `(0, 100]`.
#[must_use]
pub fn is_valid_cashback(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0 && rate <= 100.0
}

fn derive_reward_type(
    cashback_rate: Option<f64>,
    miles_rate: Option<f64>,
    installment_terms: &BTreeSet<u32>,
) -> RewardType {
    if cashback_rate.is_some() {
        RewardType::Cashback
    } else if miles_rate.is_some() {
        RewardType::Miles
    } else if !installment_terms.is_empty() {
        RewardType::InstallmentOnly
    } else {
        RewardType::NoData
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
