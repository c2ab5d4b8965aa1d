//! Normalization of date strings scraped from news listing pages.
//!
//! Listing pages publish dates in whatever shape their CMS emits:
//! `"JUL 23, 2025 4:05PM EDT"`, `"January 5, 2024"`, `"7/4/2025"`,
//! `"2025-07-23"`. This module reduces all of them to a [`NaiveDate`]
//! so discovered items can be range-filtered and sorted.
//!
//! Strings that fail every format are reported as unparseable and the
//! caller drops the candidate item.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing clock-time-and-timezone fragment, e.g. `" 4:05PM EDT"`.
/// Stripped before parsing; the date formats below cannot absorb it.
static TIME_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+\d{1,2}:\d{2}(AM|PM)\s+(EDT|EST|PST|PDT|CST|CDT|MST|MDT)?\s*$").unwrap()
});

/// Date shapes accepted from listing pages, tried in order.
///
/// `%B` accepts both full and abbreviated month names when parsing, and
/// chrono matches month names case-insensitively, so `"JUL 23, 2025"` and
/// `"July 23, 2025"` both land on the first entry. Numeric fields accept
/// days without leading zeros.
const DATE_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%m/%d/%Y", "%Y-%m-%d"];

/// Parse a scraped date string into a calendar date.
///
/// Strips any trailing time-of-day fragment, then attempts each format in
/// [`DATE_FORMATS`]. Returns `None` when no format yields a valid date.
///
/// # Arguments
///
/// * `raw` - The exact text scraped from the page
pub fn parse_display_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = TIME_SUFFIX_RE.replace(raw.trim(), "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
}
