pub mod client;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod normalize;
mod rate_limit;
pub mod types;

pub use client::{parse_location, ListingClient};
pub use crawl::{scrape_source, CrawlOptions};
pub use error::ScraperError;
pub use extract::{extract_page, CompiledSource, PageExtraction};
pub use types::{ScrapeOutcome, ScrapeReport};
