//! Field normalizers applied to raw element text.
//!
//! Every function is best-effort: unparseable input yields `None` (or an
//! empty set) and never an error, so a bad field cannot drop its record.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use partnerscan_core::records::is_valid_cashback;
use regex::Regex;

/// Longest installment plan the banks advertise, in months.
pub const MAX_INSTALLMENT_MONTHS: u32 = 60;

/// Shortest digit string still treated as a phone number.
const MIN_PHONE_DIGITS: usize = 5;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid regex"));

static MILES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*mil").expect("valid regex"));

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Collapses runs of whitespace (including `&nbsp;`) into single spaces and
/// trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps only the digits of the first listed phone number.
///
/// Several numbers separated by `;`, `,` or `/` are common; only the first
/// is used. Fewer than five digits is not a phone number.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let first = raw.split([';', ',', '/']).next().unwrap_or_default();
    let digits: String = first.chars().filter(char::is_ascii_digit).collect();
    (digits.len() >= MIN_PHONE_DIGITS).then_some(digits)
}

/// First decimal number in `text`, accepting `.` or `,` as the separator.
#[must_use]
pub fn parse_rate(text: &str) -> Option<f64> {
    let m = NUMBER.find(text)?;
    m.as_str().replace(',', ".").parse::<f64>().ok()
}

/// Cashback percentage; values outside `(0, 100]` are dropped.
#[must_use]
pub fn parse_cashback(text: &str) -> Option<f64> {
    parse_rate(text).filter(|rate| is_valid_cashback(*rate))
}

/// Miles per currency unit.
///
/// Prefers the number written right before "mil" (`"1 AZN = 3 Mil"` gives
/// 3), falling back to the first number in the text. Zero is dropped.
#[must_use]
pub fn parse_miles(text: &str) -> Option<f64> {
    let rate = MILES
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .or_else(|| parse_rate(text))?;
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Every integer in `1..=60` found in `text`, as installment months.
#[must_use]
pub fn parse_terms(text: &str) -> BTreeSet<u32> {
    INTEGER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .filter(|months| (1..=MAX_INSTALLMENT_MONTHS).contains(months))
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
