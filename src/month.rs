use crate::error::{ProjectionError, Result};
use chrono::{Datelike, Days, NaiveDate};
use schemars::JsonSchema;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month identified by year and month number, the aggregation and
/// suppression-set key used throughout the projection engine.
///
/// Serializes as the canonical `YYYY-MM` string so JSON maps keyed by month
/// match the API contract directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        last_day_of_month(self.year, self.month)
    }

    pub fn next(&self) -> Self {
        self.add_months(1)
    }

    pub fn add_months(&self, months: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: index.div_euclid(12),
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// Signed number of months from `other` to `self`.
    pub fn diff(&self, other: &MonthKey) -> i32 {
        (self.year - other.year) * 12 + self.month as i32 - other.month as i32
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ProjectionError::InvalidMonthKey(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct MonthKeyVisitor;

impl Visitor<'_> for MonthKeyVisitor {
    type Value = MonthKey;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a month key in YYYY-MM format")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<MonthKey, E> {
        v.parse().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_str(MonthKeyVisitor)
    }
}

impl JsonSchema for MonthKey {
    fn schema_name() -> String {
        "MonthKey".to_string()
    }

    fn json_schema(_: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        schemars::schema::SchemaObject {
            instance_type: Some(schemars::schema::InstanceType::String.into()),
            format: Some("YYYY-MM".to_string()),
            ..Default::default()
        }
        .into()
    }
}

/// The date range a projection run covers, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn start_month(&self) -> MonthKey {
        MonthKey::from_date(self.start)
    }

    pub fn end_month(&self) -> MonthKey {
        MonthKey::from_date(self.end)
    }

    /// Inclusive month count spanned by the window.
    pub fn months(&self) -> i32 {
        self.end_month().diff(&self.start_month()) + 1
    }

    pub fn month_keys(&self) -> Vec<MonthKey> {
        let mut keys = Vec::with_capacity(self.months().max(0) as usize);
        let end = self.end_month();
        let mut current = self.start_month();
        while current <= end {
            keys.push(current);
            current = current.next();
        }
        keys
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or(NaiveDate::MAX)
        .checked_sub_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    last_day_of_month(year, month).day()
}

/// Builds a date in the given month, clamping the requested day to the month's
/// actual length (e.g. day 31 in February resolves to the 28th or 29th).
pub fn date_in_month(month: MonthKey, day: u32) -> NaiveDate {
    let clamped = day.clamp(1, days_in_month(month.year, month.month));
    NaiveDate::from_ymd_opt(month.year, month.month, clamped).unwrap_or_else(|| month.first_day())
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    MonthKey::from_date(end).diff(&MonthKey::from_date(start))
}
