//! Date-bounded pagination crawl over a company's news listing.
//!
//! Listing sites rarely expose how many pages of history they keep, so the
//! crawl is bounded two ways: a page cap proportional to the width of the
//! requested year range, and an early-stop heuristic that halts once the
//! listing has visibly scrolled past the window chronologically.
//!
//! The early-stop rule works at year granularity even when month bounds
//! narrow the window. That asymmetry is deliberate: it can over-scan, but
//! it never stops early on a page that might still hold in-window items.
//!
//! Pages are fetched strictly sequentially with a politeness delay between
//! requests. A failed page is logged and skipped, never fatal to the crawl.

use anyhow::Result;
use chrono::Datelike;
use itertools::Itertools;
use tokio::time::sleep;
use tracing::{error, info, instrument};
use url::Url;

use crate::filter::DateRange;
use crate::models::{CrawlSpec, DiscoveredItem};
use crate::scrapers::PageClient;
use crate::scrapers::listing::extract_listing;

/// Capability interface for fetching listing pages, so the crawl loop can
/// be exercised against scripted pages in tests.
pub trait PageFetcher {
    /// Fetch the raw HTML of one listing page.
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Politeness delay enforced between successive page fetches.
    fn delay(&self) -> std::time::Duration;
}

impl PageFetcher for PageClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.fetch_html(url).await
    }

    fn delay(&self) -> std::time::Duration {
        PageClient::delay(self)
    }
}

/// Aggregated result of one crawl.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Deduplicated items, newest first.
    pub items: Vec<DiscoveredItem>,
    /// Page-counter echo reported to the client.
    pub pages_scrapped: u32,
}

/// Crawl the listing at `spec.base_url` for press releases inside the
/// requested window.
///
/// Pagination terminates on whichever comes first: the page cap
/// (`2 × year-range width`), no further pagination evidence, the
/// early-stop rule, or the cap being reached after failed pages.
#[instrument(level = "info", skip_all, fields(base_url = %spec.base_url))]
pub async fn crawl<F: PageFetcher>(fetcher: &F, spec: &CrawlSpec) -> CrawlOutcome {
    info!(
        start_year = spec.start_year,
        end_year = spec.end_year,
        "Starting base URL crawl"
    );

    let Ok(base_url) = Url::parse(&spec.base_url) else {
        error!(base_url = %spec.base_url, "Base URL is not a valid URL");
        return CrawlOutcome {
            items: Vec::new(),
            pages_scrapped: 0,
        };
    };

    let range = DateRange::new(
        spec.start_year,
        spec.end_year,
        spec.start_month,
        spec.end_month,
    );
    let max_pages = 2 * (spec.end_year - spec.start_year + 1);
    let stop_before_year = spec.start_year - 1;

    let mut collected: Vec<DiscoveredItem> = Vec::new();
    let mut current_page: i32 = 1;
    let mut should_continue = true;

    while current_page <= max_pages && should_continue {
        let url = page_url(&spec.base_url, current_page);

        match fetcher.fetch(&url).await {
            Ok(html) => {
                let page = extract_listing(&html, &base_url);
                info!(
                    page = current_page,
                    found = page.items.len(),
                    has_more = page.has_more,
                    "Scraped listing page"
                );

                for item in page.items {
                    let year = item.parsed_date.year();
                    if year < stop_before_year {
                        info!(
                            year,
                            stop_before_year,
                            "Found release predating the window; stopping pagination"
                        );
                        should_continue = false;
                        break;
                    }
                    if range.contains(item.parsed_date) {
                        collected.push(item);
                    }
                }

                if !page.has_more || !should_continue {
                    break;
                }

                current_page += 1;
                sleep(fetcher.delay()).await;
            }
            Err(e) => {
                error!(
                    page = current_page,
                    url = %url,
                    error = %e,
                    "Failed to scrape listing page; skipping"
                );
                current_page += 1;
            }
        }
    }

    let items = dedupe_and_sort(collected);
    info!(
        unique = items.len(),
        pages = current_page - 1,
        "Crawl complete"
    );

    CrawlOutcome {
        items,
        pages_scrapped: (current_page - 1) as u32,
    }
}

/// Synthesize the URL for a given page index.
///
/// Page 1 is the base URL itself; later pages append a `page=<n>` query
/// parameter. `p=` is the other common convention; only `page=` is tried.
fn page_url(base_url: &str, page: i32) -> String {
    if page <= 1 {
        return base_url.to_string();
    }
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}page={page}")
}

/// Final ordering pass over the accumulated items: newest first, one entry
/// per URL. The sort is stable, so tie order follows arrival order.
pub fn dedupe_and_sort(mut items: Vec<DiscoveredItem>) -> Vec<DiscoveredItem> {
    items.sort_by(|a, b| b.parsed_date.cmp(&a.parsed_date));
    items
        .into_iter()
        .unique_by(|item| item.url.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fetcher backed by a URL → HTML map, recording every request.
    struct ScriptedFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<(String, String)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("Failed to fetch page: 404 Not Found"))
        }

        fn delay(&self) -> Duration {
            Duration::ZERO
        }
    }

    const BASE: &str = "https://example.com/newsroom";

    fn listing_html(entries: &[(&str, &str, &str)], has_next: bool) -> String {
        let mut html = String::from("<html><body><ul>");
        for (href, title, date) in entries {
            html.push_str(&format!(
                r#"<li><a href="{href}">{title}</a><span class="date">{date}</span></li>"#
            ));
        }
        html.push_str("</ul>");
        if has_next {
            html.push_str(r#"<a class="pagination" href="?page=2">Next</a>"#);
        }
        html.push_str("</body></html>");
        html
    }

    fn spec(start_year: i32, end_year: i32) -> CrawlSpec {
        CrawlSpec {
            base_url: BASE.to_string(),
            start_year,
            end_year,
            start_month: None,
            end_month: None,
        }
    }

    fn item(url: &str, date: (i32, u32, u32)) -> DiscoveredItem {
        DiscoveredItem {
            url: url.to_string(),
            title: "t".to_string(),
            raw_date_text: "d".to_string(),
            parsed_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_early_stop_halts_after_offending_page() {
        // Window 2024-2025; stop threshold is any year < 2023. Page 2 holds
        // an in-range item, then a 2021 item, then another in-range item
        // that must be discarded because iteration stops at the trigger.
        let fetcher = ScriptedFetcher::new(vec![
            (
                BASE.to_string(),
                listing_html(&[("/news/a", "A", "2025-06-01")], true),
            ),
            (
                format!("{BASE}?page=2"),
                listing_html(
                    &[
                        ("/news/b", "B", "2024-06-01"),
                        ("/news/old", "Old", "2021-01-15"),
                        ("/news/c", "C", "2024-07-01"),
                    ],
                    true,
                ),
            ),
            (
                format!("{BASE}?page=3"),
                listing_html(&[("/news/d", "D", "2024-01-01")], false),
            ),
        ]);

        let outcome = crawl(&fetcher, &spec(2024, 2025)).await;

        assert_eq!(
            fetcher.requested(),
            vec![BASE.to_string(), format!("{BASE}?page=2")]
        );
        let urls: Vec<&str> = outcome.items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/news/a",
                "https://example.com/news/b"
            ]
        );
    }

    #[tokio::test]
    async fn test_stops_when_no_pagination_evidence() {
        let fetcher = ScriptedFetcher::new(vec![(
            BASE.to_string(),
            listing_html(&[("/news/a", "A", "2025-06-01")], false),
        )]);

        let outcome = crawl(&fetcher, &spec(2025, 2025)).await;

        assert_eq!(fetcher.requested(), vec![BASE.to_string()]);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.pages_scrapped, 0);
    }

    #[tokio::test]
    async fn test_page_cap_bounds_the_crawl() {
        // One requested year caps the crawl at two pages even though every
        // page advertises more.
        let fetcher = ScriptedFetcher::new(vec![
            (
                BASE.to_string(),
                listing_html(&[("/news/a", "A", "2025-03-01")], true),
            ),
            (
                format!("{BASE}?page=2"),
                listing_html(&[("/news/b", "B", "2025-02-01")], true),
            ),
            (
                format!("{BASE}?page=3"),
                listing_html(&[("/news/c", "C", "2025-01-01")], true),
            ),
        ]);

        let outcome = crawl(&fetcher, &spec(2025, 2025)).await;

        assert_eq!(fetcher.requested().len(), 2);
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(outcome.pages_scrapped, 2);
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped_not_fatal() {
        // Page 1 is missing from the script (404); page 2 still gets
        // fetched and contributes items.
        let fetcher = ScriptedFetcher::new(vec![(
            format!("{BASE}?page=2"),
            listing_html(&[("/news/b", "B", "2025-02-01")], false),
        )]);

        let outcome = crawl(&fetcher, &spec(2025, 2025)).await;

        assert_eq!(fetcher.requested().len(), 2);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].url, "https://example.com/news/b");
    }

    #[tokio::test]
    async fn test_out_of_range_items_filtered_in_range_kept() {
        // A 2023 item is below the window but not below start_year - 1,
        // so it is filtered without stopping the crawl.
        let fetcher = ScriptedFetcher::new(vec![(
            BASE.to_string(),
            listing_html(
                &[
                    ("/news/new", "New", "2026-01-01"),
                    ("/news/in", "In", "2025-05-01"),
                    ("/news/edge", "Edge", "2023-12-31"),
                ],
                false,
            ),
        )]);

        let outcome = crawl(&fetcher, &spec(2024, 2025)).await;

        let urls: Vec<&str> = outcome.items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/news/in"]);
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_collapse() {
        let fetcher = ScriptedFetcher::new(vec![
            (
                BASE.to_string(),
                listing_html(&[("/news/a", "A", "2025-03-01")], true),
            ),
            (
                format!("{BASE}?page=2"),
                listing_html(&[("/news/a", "A", "2025-05-01")], false),
            ),
        ]);

        let outcome = crawl(&fetcher, &spec(2025, 2025)).await;

        assert_eq!(outcome.items.len(), 1);
        // Newest-first sort runs before the URL dedupe, so the later date wins.
        assert_eq!(
            outcome.items[0].parsed_date,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
        );
    }

    #[tokio::test]
    async fn test_invalid_base_url_yields_empty_outcome() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let bad = CrawlSpec {
            base_url: "not a url".to_string(),
            ..spec(2025, 2025)
        };

        let outcome = crawl(&fetcher, &bad).await;

        assert!(outcome.items.is_empty());
        assert!(fetcher.requested().is_empty());
    }

    #[test]
    fn test_page_url_synthesis() {
        assert_eq!(page_url(BASE, 1), BASE);
        assert_eq!(page_url(BASE, 2), format!("{BASE}?page=2"));
        assert_eq!(
            page_url("https://example.com/news?tag=ir", 3),
            "https://example.com/news?tag=ir&page=3"
        );
    }

    #[test]
    fn test_dedupe_and_sort_orders_newest_first() {
        let items = vec![
            item("https://example.com/a", (2024, 1, 1)),
            item("https://example.com/b", (2025, 6, 1)),
            item("https://example.com/c", (2024, 12, 31)),
        ];
        let sorted = dedupe_and_sort(items);
        let urls: Vec<&str> = sorted.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/b",
                "https://example.com/c",
                "https://example.com/a"
            ]
        );
    }

    #[test]
    fn test_dedupe_keeps_one_entry_per_url() {
        let items = vec![
            item("https://example.com/a", (2024, 1, 1)),
            item("https://example.com/a", (2024, 1, 1)),
            item("https://example.com/b", (2023, 1, 1)),
        ];
        let deduped = dedupe_and_sort(items);
        assert_eq!(deduped.len(), 2);
    }
}
