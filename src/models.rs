//! Data models for press-release discovery and the HTTP wire format.
//!
//! This module defines the core data structures used throughout the service:
//! - [`DiscoveredItem`]: one candidate press release found on a listing page
//! - [`CrawlRequest`] / [`CrawlSpec`]: raw and validated crawl parameters
//! - [`CrawlResponse`] and friends: JSON response bodies
//!
//! Wire field names use camelCase to match the JSON contract expected by
//! clients, mapped via `#[serde(rename_all = "camelCase")]`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One candidate press release discovered on a listing page.
///
/// Items are created during a single page scrape and are immutable
/// afterwards. Candidates whose date text fails parsing are never
/// constructed; `parsed_date` is always a real calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredItem {
    /// Absolute URL, resolved against the listing's base URL at discovery.
    pub url: String,
    /// Display text of the link; never empty for a retained item.
    pub title: String,
    /// The exact substring the date was derived from, kept for display.
    pub raw_date_text: String,
    /// The normalized calendar date used for filtering and sorting.
    pub parsed_date: NaiveDate,
}

/// Body of `POST /api/scrape-and-summarize` and its batch variant.
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub url: Option<String>,
}

/// Body of `POST /api/batch-summarize`: a user-selected set of release URLs.
#[derive(Debug, Deserialize)]
pub struct BatchSummarizeRequest {
    pub urls: Option<Vec<String>>,
}

/// Per-item outcome of a batch summarization fan-out.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub url: String,
    pub summary: String,
}

/// Body of `POST /api/generate-docx`.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub summary: Option<String>,
    pub url: Option<String>,
}

/// Raw body of `POST /api/scrape-base-url`, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub base_url: Option<String>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub start_month: Option<u32>,
    pub end_month: Option<u32>,
}

impl CrawlRequest {
    /// Validate the request into a [`CrawlSpec`].
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when a required field is missing,
    /// the years are out of order, or a month falls outside 1..=12.
    pub fn validate(&self) -> Result<CrawlSpec, String> {
        let (Some(base_url), Some(start_year), Some(end_year)) =
            (self.base_url.clone(), self.start_year, self.end_year)
        else {
            return Err("Base URL, start year, and end year are required".to_string());
        };

        if start_year > end_year {
            return Err("Start year must be less than or equal to end year".to_string());
        }

        for month in [self.start_month, self.end_month].into_iter().flatten() {
            if !(1..=12).contains(&month) {
                return Err("Months must be between 1 and 12".to_string());
            }
        }

        Ok(CrawlSpec {
            base_url,
            start_year,
            end_year,
            start_month: self.start_month,
            end_month: self.end_month,
        })
    }
}

/// A validated crawl request.
#[derive(Debug, Clone)]
pub struct CrawlSpec {
    pub base_url: String,
    pub start_year: i32,
    pub end_year: i32,
    pub start_month: Option<u32>,
    pub end_month: Option<u32>,
}

impl CrawlSpec {
    /// Year-range echo, e.g. `"2023-2025"`.
    pub fn year_range(&self) -> String {
        format!("{}-{}", self.start_year, self.end_year)
    }

    /// Effective date-range description with the month bounds applied,
    /// e.g. `"2023-07 to 2025-12"`.
    pub fn date_range(&self) -> String {
        format!(
            "{}-{:02} to {}-{:02}",
            self.start_year,
            self.start_month.unwrap_or(1),
            self.end_year,
            self.end_month.unwrap_or(12)
        )
    }
}

/// One press release in the crawl response body.
#[derive(Debug, Serialize)]
pub struct PressReleaseEntry {
    pub url: String,
    pub date: String,
    pub title: String,
}

impl From<DiscoveredItem> for PressReleaseEntry {
    fn from(item: DiscoveredItem) -> Self {
        Self {
            url: item.url,
            date: item.raw_date_text,
            title: item.title,
        }
    }
}

/// Response body of `POST /api/scrape-base-url`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResponse {
    pub success: bool,
    pub press_releases: Vec<PressReleaseEntry>,
    pub total_found: usize,
    pub year_range: String,
    pub date_range: String,
    pub pages_scrapped: u32,
}
