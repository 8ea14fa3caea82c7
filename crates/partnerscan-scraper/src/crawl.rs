//! Multi-page crawl of one configured source.

use std::collections::HashSet;
use std::time::Duration;

use partnerscan_core::{PartnerRecord, SourceConfig};
use reqwest::Url;
use scraper::Html;
use tokio::task::JoinHandle;

use crate::client::{page_key, parse_location, ListingClient};
use crate::error::ScraperError;
use crate::extract::CompiledSource;
use crate::types::{ScrapeOutcome, ScrapeReport};

/// Run-wide crawl settings. A source's own `max_pages` overrides
/// `max_pages` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    pub max_pages: usize,
    /// Delay before every page request except the first.
    pub inter_request_delay_ms: u64,
    /// Start fetching page N+1 while page N is being extracted.
    pub pipeline: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: 200,
            inter_request_delay_ms: 400,
            pipeline: false,
        }
    }
}

type Prefetch = JoinHandle<Result<String, ScraperError>>;

/// A page waiting to be consumed: either still to fetch, or already in
/// flight on a spawned task.
enum NextPage {
    Fetch(Url),
    Prefetched(Url, Prefetch),
}

/// Scrapes every page of `source`, following next-page links.
///
/// Pagination stops when there is no next link, when the page ceiling is
/// reached, when a link points to a page already visited, or when a page
/// repeats the previous page's entries. A page that still fails after its
/// retries ends pagination; records from earlier pages are kept and the
/// failure is counted in the report.
///
/// # Errors
///
/// Returns an error only when the source itself is unusable: an invalid
/// selector or URL, or a first page that is an unreadable local capture or
/// an empty document.
pub async fn scrape_source(
    client: &ListingClient,
    source: &SourceConfig,
    options: &CrawlOptions,
) -> Result<ScrapeOutcome, ScraperError> {
    let compiled = CompiledSource::compile(source)?;
    let start = parse_location(&source.url)?;
    let max_pages = source.max_pages.unwrap_or(options.max_pages).max(1);

    let mut report = ScrapeReport::started(&source.name);
    let mut records: Vec<PartnerRecord> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut previous_names: Vec<String> = Vec::new();
    let mut pending = Some(NextPage::Fetch(start));
    let mut page_number = 0usize;

    while let Some(next) = pending.take() {
        page_number += 1;
        let (url, fetched) = match next {
            NextPage::Fetch(url) => {
                if page_number > 1 {
                    pause(options.inter_request_delay_ms).await;
                }
                let fetched = client.fetch_page(&url).await;
                (url, fetched)
            }
            NextPage::Prefetched(url, handle) => {
                let fetched = handle.await.unwrap_or_else(|e| {
                    Err(ScraperError::FetchTask {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })
                });
                (url, fetched)
            }
        };

        let html = match fetched {
            Ok(html) => html,
            Err(e) if page_number == 1 && e.is_source_error() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    source = %source.name,
                    page = page_number,
                    url = %url,
                    error = %e,
                    "page fetch failed, stopping pagination"
                );
                report.pages_failed += 1;
                break;
            }
        };
        report.pages_fetched += 1;
        visited.insert(page_key(&url));

        let extraction = {
            let document = Html::parse_document(&html);

            let next_url = compiled
                .next_link(&document, &url)
                .filter(|next| {
                    let seen = visited.contains(&page_key(next));
                    if seen {
                        tracing::info!(
                            source = %source.name,
                            page = page_number,
                            next = %next,
                            "next link points to a visited page, stopping"
                        );
                        report.cycle_detected = true;
                    }
                    !seen
                })
                .filter(|next| {
                    let at_limit = page_number >= max_pages;
                    if at_limit {
                        tracing::warn!(
                            source = %source.name,
                            max_pages,
                            next = %next,
                            "page limit reached with more pages available"
                        );
                        report.hit_page_limit = true;
                    }
                    !at_limit
                });

            pending = next_url.map(|next| {
                if options.pipeline {
                    let handle = spawn_prefetch(client, &next, options.inter_request_delay_ms);
                    NextPage::Prefetched(next, handle)
                } else {
                    NextPage::Fetch(next)
                }
            });

            compiled.extract_entries(&document)
        };

        let names: Vec<String> = extraction
            .records
            .iter()
            .map(|r| r.name().to_owned())
            .collect();
        if !names.is_empty() && names == previous_names {
            tracing::info!(
                source = %source.name,
                page = page_number,
                "page repeats the previous page, stopping"
            );
            report.cycle_detected = true;
            if let Some(NextPage::Prefetched(_, handle)) = pending.take() {
                handle.abort();
            }
            break;
        }
        previous_names = names;

        tracing::debug!(
            source = %source.name,
            page = page_number,
            records = extraction.records.len(),
            skipped = extraction.skipped,
            "page extracted"
        );
        report.entries_skipped += extraction.skipped;
        records.extend(extraction.records);
    }

    report.records_extracted = records.len();
    report.finished_at = chrono::Utc::now();
    tracing::info!(
        source = %report.source,
        pages = report.pages_fetched,
        records = report.records_extracted,
        skipped = report.entries_skipped,
        failed_pages = report.pages_failed,
        "source scraped"
    );

    Ok(ScrapeOutcome { records, report })
}

fn spawn_prefetch(client: &ListingClient, url: &Url, delay_ms: u64) -> Prefetch {
    let client = client.clone();
    let url = url.clone();
    tokio::spawn(async move {
        pause(delay_ms).await;
        client.fetch_page(&url).await
    })
}

async fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
