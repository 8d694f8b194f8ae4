//! Derived rollup rows. These are recomputed on every query and never persisted.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// An ISO week bucket key. The year is the ISO week-year, not the calendar year, so week 1 of
/// year N and week 52/53 of year N-1 are distinct buckets even when adjacent in time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }
}

impl Display for WeekKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// One calendar day's total.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total: Decimal,
    /// Present only when a daily goal is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_met: Option<bool>,
}

impl DailySummary {
    /// The "YYYY-MM" month this day belongs to.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// One ISO week's total.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub week: WeekKey,
    pub total: Decimal,
}

/// One calendar month's total, keyed "YYYY-MM".
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub total: Decimal,
}
