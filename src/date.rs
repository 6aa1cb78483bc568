//! Date keys and month arithmetic
//!
//! Every task is filed under a *date key*: the `YYYY-MM-DD` rendering of a calendar day, taken from the local
//! (timezone-naive) fields of the date, never from its UTC counterpart.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, TimeZone};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Format a calendar day as a date key (`YYYY-MM-DD`, zero-padded)
pub fn to_local_date_key(date: &NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Date key of an instant, using the calendar fields of the instant's own timezone
pub fn date_key_of<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    to_local_date_key(&instant.date_naive())
}

/// The current local day
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Date key of the current local day
pub fn today_key() -> String {
    date_key_of(&Local::now())
}

/// Parse a date key back into a calendar day
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).ok()
}

/// Header of the day view, e.g. `16 Oct, Fri`
pub fn day_header(date: &NaiveDate) -> String {
    date.format("%d %b, %a").to_string()
}


/// A (year, month) pair, as focused by the calendar view
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    /// Always the first day of the month
    first: NaiveDate,
}

impl YearMonth {
    /// Returns `None` if `month` is not in `1..=12` or the year is out of range
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// The month that contains `date`
    pub fn of(date: &NaiveDate) -> Self {
        Self { first: date.with_day(1).unwrap_or(*date) }
    }

    pub fn year(&self) -> i32   { self.first.year() }
    pub fn month(&self) -> u32  { self.first.month() }
    pub fn first_day(&self) -> NaiveDate { self.first }

    /// The following month. Saturates at the end of the supported date range
    pub fn next(&self) -> Self {
        match self.first.checked_add_months(Months::new(1)) {
            Some(first) => Self { first },
            None => *self,
        }
    }

    /// The preceding month. Saturates at the start of the supported date range
    pub fn prev(&self) -> Self {
        match self.first.checked_sub_months(Months::new(1)) {
            Some(first) => Self { first },
            None => *self,
        }
    }

    /// Number of days in this month, derived from the day before the first of the next month
    pub fn days_in_month(&self) -> u32 {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            m => (self.year(), m + 1),
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next_first| next_first.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31)
    }

    /// Every day of this month, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first;
        (0..self.days_in_month()).filter_map(move |offset| first.with_day(offset + 1))
    }

    /// Header of the month grid, e.g. `October 2026`
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}
