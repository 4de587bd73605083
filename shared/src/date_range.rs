//! Named date filters resolved to concrete `{from, to}` boundaries
//!
//! Every boundary is derived from the supplied `now`; nothing is carried
//! over between filters.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::DateTimeRange;

/// Date filters offered on dashboards and lists
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum DateFilter {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    Last7Days,
    /// Fallback for any other label
    #[default]
    Last30Days,
}

impl DateFilter {
    /// Map a UI label; unknown labels fall back to the last 30 days
    pub fn from_label(label: &str) -> Self {
        match label {
            "Today" => DateFilter::Today,
            "Yesterday" => DateFilter::Yesterday,
            "This Week" => DateFilter::ThisWeek,
            "This Month" => DateFilter::ThisMonth,
            "Last 7 Days" => DateFilter::Last7Days,
            _ => DateFilter::Last30Days,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateFilter::Today => "Today",
            DateFilter::Yesterday => "Yesterday",
            DateFilter::ThisWeek => "This Week",
            DateFilter::ThisMonth => "This Month",
            DateFilter::Last7Days => "Last 7 Days",
            DateFilter::Last30Days => "Last 30 Days",
        }
    }

    /// Resolve the filter against `now`
    pub fn resolve(&self, now: NaiveDateTime) -> DateTimeRange {
        let today = now.date();
        match self {
            DateFilter::Today => whole_days(today, today),
            DateFilter::Yesterday => {
                let yesterday = today - Duration::days(1);
                whole_days(yesterday, yesterday)
            }
            DateFilter::ThisWeek => {
                let sunday = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
                whole_days(sunday, sunday + Duration::days(6))
            }
            DateFilter::ThisMonth => whole_days(first_day_of_month(today), last_day_of_month(today)),
            DateFilter::Last7Days => whole_days(today - Duration::days(6), today),
            // Keeps the current time of day on both ends
            DateFilter::Last30Days => DateTimeRange {
                from: now - Duration::days(30),
                to: now,
            },
        }
    }
}

impl From<String> for DateFilter {
    fn from(label: String) -> Self {
        DateFilter::from_label(&label)
    }
}

impl From<DateFilter> for String {
    fn from(filter: DateFilter) -> Self {
        filter.label().to_string()
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolve a filter label against `now`
pub fn convert_filter_to_date_range(label: &str, now: NaiveDateTime) -> DateTimeRange {
    DateFilter::from_label(label).resolve(now)
}

/// 00:00:00.000 of the given day
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 of the given day
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let mut last = first_day_of_month(date) + Duration::days(27);
    while (last + Duration::days(1)).month() == date.month() {
        last += Duration::days(1);
    }
    last
}

fn whole_days(first: NaiveDate, last: NaiveDate) -> DateTimeRange {
    DateTimeRange {
        from: start_of_day(first),
        to: end_of_day(last),
    }
}
