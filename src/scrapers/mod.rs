//! Page scraping: outbound fetching plus the two HTML extractors.
//!
//! Two extraction concerns live here, mirroring the two kinds of page the
//! service reads:
//!
//! 1. **Listing pages** ([`listing`]): a company's news index. Extraction
//!    hunts for press-release links, their titles, and nearby date text.
//! 2. **Article pages** ([`article`]): a single press release. Extraction
//!    pulls the visible main-content text for summarization.
//!
//! Both extractors are pure functions over raw HTML so they can be tested
//! without a network. Fetching goes through [`PageClient`], which carries
//! the fixed desktop User-Agent and the politeness delay used between
//! listing-page requests.

use std::time::Duration;

use anyhow::{Result, bail};
use reqwest::Client;

pub mod article;
pub mod listing;

/// Fixed desktop browser User-Agent sent on every outbound page fetch.
/// Many corporate news sites serve bot-labelled clients an empty shell.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// HTTP client for fetching pages to scrape.
///
/// Wraps a shared [`reqwest::Client`] configured with the desktop
/// User-Agent, plus the politeness delay the pagination crawler waits
/// between successive listing-page fetches.
#[derive(Clone)]
pub struct PageClient {
    http: Client,
    delay: Duration,
}

impl PageClient {
    /// Build a client with the given politeness delay.
    pub fn new(delay: Duration) -> Self {
        let http = Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .build()
            .unwrap();
        Self { http, delay }
    }

    /// Delay enforced between successive listing-page fetches.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetch a page and return its body as text.
    ///
    /// # Errors
    ///
    /// Fails on network errors or any non-2xx status. No retries are
    /// attempted; callers decide whether a failed fetch is fatal.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!(
                "Failed to fetch page: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
        }
        Ok(response.text().await?)
    }
}
