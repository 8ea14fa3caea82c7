use chrono::{DateTime, Utc};
use partnerscan_core::PartnerRecord;
use serde::Serialize;

/// Per-source tally of one scrape run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    pub source: String,
    pub pages_fetched: usize,
    /// Pages abandoned after their retries ran out. At most one per run,
    /// since pagination cannot continue past a failed page.
    pub pages_failed: usize,
    pub entries_skipped: usize,
    pub records_extracted: usize,
    /// A next-page link existed when the page ceiling was reached.
    pub hit_page_limit: bool,
    /// Pagination ended on a link or page seen before.
    pub cycle_detected: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScrapeReport {
    pub(crate) fn started(source: &str) -> Self {
        let now = Utc::now();
        Self {
            source: source.to_owned(),
            pages_fetched: 0,
            pages_failed: 0,
            entries_skipped: 0,
            records_extracted: 0,
            hit_page_limit: false,
            cycle_detected: false,
            started_at: now,
            finished_at: now,
        }
    }

    /// Adds another report's counters into this one; used for run totals.
    pub fn absorb(&mut self, other: &ScrapeReport) {
        self.pages_fetched += other.pages_fetched;
        self.pages_failed += other.pages_failed;
        self.entries_skipped += other.entries_skipped;
        self.records_extracted += other.records_extracted;
        self.hit_page_limit |= other.hit_page_limit;
        self.cycle_detected |= other.cycle_detected;
        self.started_at = self.started_at.min(other.started_at);
        self.finished_at = self.finished_at.max(other.finished_at);
    }
}

/// Records of one source, in page order, plus the run report.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub records: Vec<PartnerRecord>,
    pub report: ScrapeReport,
}
