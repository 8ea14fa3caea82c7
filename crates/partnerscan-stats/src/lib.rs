//! Summary tables over scraped partner records.

pub mod dimension;
pub mod overview;
pub mod summary;
pub mod supplemental;

pub use dimension::{Dimension, UnknownDimension, UNKNOWN};
pub use overview::Overview;
pub use summary::{cross, summarize, SummaryRow, CROSS_KEY_SEPARATOR};
pub use supplemental::{
    cashback_distribution, completeness, filter_source, installment_coverage, DEFAULT_MILESTONES,
};
