//! Year/month window checks for discovered press releases.
//!
//! A crawl request always carries a start and end year; months are
//! optional refinements. A missing start month widens the window to
//! January 1, a missing end month widens it to December 31.

use chrono::NaiveDate;

/// Inclusive date window derived from a crawl request's year/month bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build the effective window from year bounds and optional month bounds.
    ///
    /// Years must already be validated (`start_year <= end_year`, months in
    /// 1..=12); the request validation layer guarantees this.
    pub fn new(
        start_year: i32,
        end_year: i32,
        start_month: Option<u32>,
        end_month: Option<u32>,
    ) -> Self {
        let start = NaiveDate::from_ymd_opt(start_year, start_month.unwrap_or(1), 1).unwrap();
        let end = match end_month {
            Some(month) => last_day_of_month(end_year, month),
            None => NaiveDate::from_ymd_opt(end_year, 12, 31).unwrap(),
        };
        Self { start, end }
    }

    /// Whether the given date falls inside the window, bounds included.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Last calendar day of a month, leap years included: the day before the
/// first of the following month.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next.unwrap().pred_opt().unwrap()
}
