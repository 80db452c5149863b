use crate::month::{date_in_month, MonthKey};
use chrono::{Datelike, Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How often a recurring contribution or payment happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];
}

/// Average number of occurrences per calendar month.
pub fn occurrences_per_month(freq: Frequency) -> f64 {
    match freq {
        Frequency::Daily => 30.0,
        Frequency::Weekly => 52.0 / 12.0,
        Frequency::Biweekly => 26.0 / 12.0,
        Frequency::Monthly => 1.0,
        Frequency::Quarterly => 1.0 / 3.0,
        Frequency::Yearly => 1.0 / 12.0,
    }
}

/// Converts a per-period amount into its monthly equivalent, rounded to the
/// nearest cent.
pub fn monthly_equivalent_cents(amount_cents: i64, freq: Frequency) -> i64 {
    (amount_cents as f64 * occurrences_per_month(freq)).round() as i64
}

/// Whether a recurrence anchored at `anchor` produces an event in `target`.
///
/// Months before the anchor month never match. Daily through monthly cadences
/// hit every month from the anchor onward; quarterly and yearly hit on their
/// month offset from the anchor. The anchor month itself always matches.
pub fn should_include_in_month(freq: Frequency, anchor: NaiveDate, target: MonthKey) -> bool {
    let anchor_month = MonthKey::from_date(anchor);
    let months_diff = target.diff(&anchor_month);
    if months_diff < 0 {
        return false;
    }

    match freq {
        Frequency::Daily | Frequency::Weekly | Frequency::Biweekly | Frequency::Monthly => true,
        Frequency::Quarterly => months_diff % 3 == 0,
        Frequency::Yearly => months_diff % 12 == 0,
    }
}

/// The calendar date of the occurrence following `last`.
pub fn next_occurrence(freq: Frequency, last: NaiveDate) -> NaiveDate {
    match freq {
        Frequency::Daily => last + Duration::days(1),
        Frequency::Weekly => last + Duration::days(7),
        Frequency::Biweekly => last + Duration::days(14),
        Frequency::Monthly => add_calendar_months(last, 1),
        Frequency::Quarterly => add_calendar_months(last, 3),
        Frequency::Yearly => add_calendar_months(last, 12),
    }
}

fn add_calendar_months(date: NaiveDate, months: i32) -> NaiveDate {
    let target = MonthKey::from_date(date).add_months(months);
    date_in_month(target, date.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_occurrences_per_month_table() {
        assert_eq!(occurrences_per_month(Frequency::Daily), 30.0);
        assert!((occurrences_per_month(Frequency::Weekly) - 52.0 / 12.0).abs() < 1e-12);
        assert!((occurrences_per_month(Frequency::Biweekly) - 26.0 / 12.0).abs() < 1e-12);
        assert_eq!(occurrences_per_month(Frequency::Monthly), 1.0);
        assert!((occurrences_per_month(Frequency::Quarterly) - 1.0 / 3.0).abs() < 1e-12);
        assert!((occurrences_per_month(Frequency::Yearly) - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_monthly_equivalent_rounds() {
        assert_eq!(monthly_equivalent_cents(1000, Frequency::Monthly), 1000);
        assert_eq!(monthly_equivalent_cents(1000, Frequency::Daily), 30000);
        // 1000 * 52 / 12 = 4333.33...
        assert_eq!(monthly_equivalent_cents(1000, Frequency::Weekly), 4333);
        assert_eq!(monthly_equivalent_cents(1200, Frequency::Yearly), 100);
    }

    #[test]
    fn test_anchor_month_always_included() {
        let anchor = date(2026, 5, 17);
        let anchor_month = MonthKey::from_date(anchor);
        for freq in Frequency::ALL {
            assert!(
                should_include_in_month(freq, anchor, anchor_month),
                "{freq:?} should include its anchor month"
            );
        }
    }

    #[test]
    fn test_months_before_anchor_excluded() {
        let anchor = date(2026, 5, 1);
        for freq in Frequency::ALL {
            assert!(!should_include_in_month(
                freq,
                anchor,
                MonthKey::new(2026, 4)
            ));
        }
    }

    #[test]
    fn test_quarterly_cadence() {
        let anchor = date(2026, 1, 10);
        assert!(should_include_in_month(
            Frequency::Quarterly,
            anchor,
            MonthKey::new(2026, 4)
        ));
        assert!(!should_include_in_month(
            Frequency::Quarterly,
            anchor,
            MonthKey::new(2026, 5)
        ));
        assert!(should_include_in_month(
            Frequency::Quarterly,
            anchor,
            MonthKey::new(2026, 7)
        ));
    }

    #[test]
    fn test_yearly_cadence() {
        let anchor = date(2026, 3, 1);
        assert!(!should_include_in_month(
            Frequency::Yearly,
            anchor,
            MonthKey::new(2026, 9)
        ));
        assert!(should_include_in_month(
            Frequency::Yearly,
            anchor,
            MonthKey::new(2027, 3)
        ));
    }

    #[test]
    fn test_next_occurrence_deltas() {
        let from = date(2026, 1, 31);
        assert_eq!(next_occurrence(Frequency::Daily, from), date(2026, 2, 1));
        assert_eq!(next_occurrence(Frequency::Weekly, from), date(2026, 2, 7));
        assert_eq!(next_occurrence(Frequency::Biweekly, from), date(2026, 2, 14));
        // Day 31 clamps to February's length.
        assert_eq!(next_occurrence(Frequency::Monthly, from), date(2026, 2, 28));
        assert_eq!(next_occurrence(Frequency::Quarterly, from), date(2026, 4, 30));
        assert_eq!(next_occurrence(Frequency::Yearly, from), date(2027, 1, 31));
    }
}
