//! Press-release discovery on a company's news listing page.
//!
//! Corporate news indexes share no markup convention, so discovery is
//! heuristic: an ordered list of link-selection heuristics is tried until
//! one yields candidate links, then each candidate is paired with a date
//! found near it in the DOM. Candidates without a usable title or a
//! parseable date are dropped.
//!
//! The heuristic order is a deliberate priority, not an accumulation:
//! later entries are fallbacks for pages the earlier ones miss.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::dates::parse_display_date;
use crate::models::DiscoveredItem;
use crate::utils::collapse_whitespace;

/// Result of scraping one listing page.
#[derive(Debug)]
pub struct ListingPage {
    /// Discovered items, deduplicated by URL within this page.
    pub items: Vec<DiscoveredItem>,
    /// Whether the page shows evidence of further pages.
    pub has_more: bool,
}

/// Capability interface for one link-selection heuristic.
///
/// Heuristics are evaluated in order; the first that yields at least one
/// candidate link wins and the rest are skipped.
pub trait CandidateFinder: Send + Sync {
    /// Short label for logging.
    fn name(&self) -> &'static str;

    /// All candidate links this heuristic matches in the document.
    fn find_candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;
}

/// A [`CandidateFinder`] backed by a CSS selector group.
struct SelectorHeuristic {
    name: &'static str,
    selector: Selector,
}

impl SelectorHeuristic {
    fn new(name: &'static str, css: &str) -> Self {
        Self {
            name,
            selector: Selector::parse(css).unwrap(),
        }
    }
}

impl CandidateFinder for SelectorHeuristic {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find_candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }
}

/// Link-selection heuristics in priority order.
static HEURISTICS: Lazy<Vec<SelectorHeuristic>> = Lazy::new(|| {
    vec![
        SelectorHeuristic::new(
            "href-keyword",
            r#"a[href*="press"], a[href*="news"], a[href*="release"]"#,
        ),
        SelectorHeuristic::new("listing-class", ".press-release a, .news-item a, .post a"),
        SelectorHeuristic::new("generic-container", "article a, .entry a, .item a"),
        SelectorHeuristic::new(
            "path-prefix",
            r#"a[href*="/press-release"], a[href*="/news/"], a[href*="/pr/"]"#,
        ),
    ]
});

/// Selectors suggesting a date-bearing element, tried in order within a
/// candidate's container.
static DATE_CLASS_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        ".date",
        ".time",
        ".published",
        r#"[class*="date"]"#,
        r#"[class*="time"]"#,
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});

/// Common date shapes, matched against a container's full text when no
/// date-classed element is present.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)\s+\d{1,2},?\s+\d{4}",
        r"(?i)\b(January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}",
        r"\d{1,2}/\d{1,2}/\d{4}",
        r"\d{4}-\d{2}-\d{2}",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Evidence of pagination controls.
static PAGINATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"a[href*="page="], a[href*="p="], .next, .pagination a, [class*="next"]"#)
        .unwrap()
});

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

static ANY_ELEMENT: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());

/// Scrape one listing page for press-release candidates.
///
/// Relative hrefs are resolved against `base_url` (the listing URL the
/// client submitted, which is also what synthesized page URLs derive from).
///
/// # Arguments
///
/// * `html` - Raw markup of the listing page
/// * `base_url` - URL to resolve relative links against
pub fn extract_listing(html: &str, base_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let mut items: Vec<DiscoveredItem> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for heuristic in HEURISTICS.iter() {
        let candidates = heuristic.find_candidates(&document);
        if candidates.is_empty() {
            continue;
        }
        debug!(
            heuristic = heuristic.name(),
            candidates = candidates.len(),
            "Link heuristic matched"
        );

        for link in candidates {
            if let Some(item) = discover_item(link, base_url) {
                if seen.insert(item.url.clone()) {
                    items.push(item);
                }
            }
        }
        // First heuristic with candidates wins; the rest are fallbacks.
        break;
    }

    ListingPage {
        items,
        has_more: has_pagination(&document),
    }
}

/// Turn one candidate link into a [`DiscoveredItem`], or discard it.
fn discover_item(link: ElementRef<'_>, base_url: &Url) -> Option<DiscoveredItem> {
    let href = link.value().attr("href")?;
    let url = base_url.join(href).ok()?.to_string();

    // Direct text of the link; fall back to its first descendant element.
    let direct: String = link
        .children()
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect();
    let mut title = collapse_whitespace(&direct);
    if title.is_empty() {
        title = link
            .select(&ANY_ELEMENT)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();
    }
    if title.is_empty() {
        return None;
    }

    let container = nearest_container(link)?;
    let raw_date_text = find_date_text(container)?;
    let parsed_date = parse_display_date(&raw_date_text)?;

    Some(DiscoveredItem {
        url,
        title,
        raw_date_text,
        parsed_date,
    })
}

/// Nearest structural container of a link: the link itself or the closest
/// ancestor that is a `li`/`div`/`article` or carries an
/// `item`/`post`/`entry` class.
fn nearest_container(link: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut current = Some(link);
    while let Some(element) = current {
        let value = element.value();
        if matches!(value.name(), "li" | "div" | "article")
            || value.classes().any(|c| matches!(c, "item" | "post" | "entry"))
        {
            return Some(element);
        }
        current = element.parent().and_then(ElementRef::wrap);
    }
    None
}

/// Locate date text inside a container: date-suggestive elements first,
/// then date-shape patterns over the container's full text.
fn find_date_text(container: ElementRef<'_>) -> Option<String> {
    let mut date_text = String::new();
    for selector in DATE_CLASS_SELECTORS.iter() {
        if let Some(element) = container.select(selector).next() {
            date_text = element.text().collect::<String>().trim().to_string();
            break;
        }
    }

    if date_text.is_empty() {
        let container_text: String = container.text().collect();
        for pattern in DATE_PATTERNS.iter() {
            if let Some(found) = pattern.find(&container_text) {
                date_text = found.as_str().to_string();
                break;
            }
        }
    }

    if date_text.is_empty() {
        None
    } else {
        Some(date_text)
    }
}

/// Whether the page contains anything resembling a "next page" control.
fn has_pagination(document: &Html) -> bool {
    if document.select(&PAGINATION_SELECTOR).next().is_some() {
        return true;
    }
    document.select(&ANCHOR_SELECTOR).any(|anchor| {
        let text = anchor.text().collect::<String>();
        let text = text.trim();
        text.contains("Next") || text.contains('>')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn base() -> Url {
        Url::parse("https://example.com/newsroom").unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
          <ul>
            <li>
              <a href="/news/acme-acquires-widgetco">Acme Acquires WidgetCo</a>
              <span class="date">JUL 23, 2025 4:05PM EDT</span>
            </li>
            <li>
              <a href="/news/q2-earnings">Acme Reports Q2 Earnings</a>
              <span class="date">July 1, 2025</span>
            </li>
            <li>
              <a href="/news/no-date-here">Dateless Item</a>
            </li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn test_extracts_titled_dated_links() {
        let page = extract_listing(LISTING, &base());
        assert_eq!(page.items.len(), 2);

        let first = &page.items[0];
        assert_eq!(first.url, "https://example.com/news/acme-acquires-widgetco");
        assert_eq!(first.title, "Acme Acquires WidgetCo");
        assert_eq!(first.raw_date_text, "JUL 23, 2025 4:05PM EDT");
        assert_eq!(
            first.parsed_date,
            NaiveDate::from_ymd_opt(2025, 7, 23).unwrap()
        );
    }

    #[test]
    fn test_dateless_candidates_are_dropped() {
        let page = extract_listing(LISTING, &base());
        assert!(page.items.iter().all(|item| !item.url.contains("no-date-here")));
    }

    #[test]
    fn test_no_pagination_evidence() {
        let page = extract_listing(LISTING, &base());
        assert!(!page.has_more);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let first = extract_listing(LISTING, &base());
        let second = extract_listing(LISTING, &base());
        assert_eq!(first.items, second.items);
        assert_eq!(first.has_more, second.has_more);
    }

    #[test]
    fn test_first_heuristic_wins() {
        // Both an href-keyword link and a .news-item link are present; only
        // the href-keyword heuristic's candidates should be processed.
        let html = r#"
            <div>
              <a href="/press/alpha">Alpha</a>
              <span class="date">2025-03-01</span>
            </div>
            <div class="news-item">
              <a href="/updates/beta">Beta</a>
              <span class="date">2025-03-02</span>
            </div>
        "#;
        let page = extract_listing(html, &base());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].url, "https://example.com/press/alpha");
    }

    #[test]
    fn test_fallback_heuristic_used_when_first_yields_nothing() {
        let html = r#"
            <div class="news-item">
              <a href="/updates/beta">Beta</a>
              <span class="date">2025-03-02</span>
            </div>
        "#;
        let page = extract_listing(html, &base());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Beta");
    }

    #[test]
    fn test_date_from_container_text_pattern() {
        let html = r#"
            <li>
              <a href="/news/gamma">Gamma Launch</a>
              Published on March 14, 2025 by the comms team.
            </li>
        "#;
        let page = extract_listing(html, &base());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].raw_date_text, "March 14, 2025");
        assert_eq!(
            page.items[0].parsed_date,
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_title_falls_back_to_descendant_element() {
        let html = r#"
            <li>
              <a href="/news/delta"><span>Delta Opens New Plant</span></a>
              <span class="date">2025-04-01</span>
            </li>
        "#;
        let page = extract_listing(html, &base());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Delta Opens New Plant");
    }

    #[test]
    fn test_duplicate_urls_within_page_are_deduplicated() {
        let html = r#"
            <li>
              <a href="/news/epsilon">Epsilon Expands</a>
              <span class="date">2025-05-01</span>
            </li>
            <li>
              <a href="/news/epsilon">Epsilon Expands (again)</a>
              <span class="date">2025-05-02</span>
            </li>
        "#;
        let page = extract_listing(html, &base());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Epsilon Expands");
    }

    #[test]
    fn test_absolute_hrefs_kept_as_is() {
        let html = r#"
            <li>
              <a href="https://cdn.example.org/news/zeta">Zeta News</a>
              <span class="date">2025-06-01</span>
            </li>
        "#;
        let page = extract_listing(html, &base());
        assert_eq!(page.items[0].url, "https://cdn.example.org/news/zeta");
    }

    #[test]
    fn test_pagination_via_query_parameter_link() {
        let html = r#"
            <li><a href="/news/a">A</a><span class="date">2025-01-01</span></li>
            <a href="/newsroom?page=2">2</a>
        "#;
        assert!(extract_listing(html, &base()).has_more);
    }

    #[test]
    fn test_pagination_via_next_anchor_text() {
        let html = r#"
            <li><a href="/news/a">A</a><span class="date">2025-01-01</span></li>
            <a href="/newsroom/older">Next</a>
        "#;
        assert!(extract_listing(html, &base()).has_more);
    }

    #[test]
    fn test_pagination_via_next_class() {
        let html = r#"
            <li><a href="/news/a">A</a><span class="date">2025-01-01</span></li>
            <span class="next-link">more</span>
        "#;
        assert!(extract_listing(html, &base()).has_more);
    }
}
