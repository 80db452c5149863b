//! Chart-series shaping: reconciles realized and projected monthly totals
//! into a single display series with an explicit actual/planned split. No
//! rendering concerns live here; this only honors the aggregator's output
//! contract for chart consumers.

use crate::month::{DateWindow, MonthKey};
use crate::MonthlyTotal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One month of the display series. `actual` is present only for months with
/// realized data; `planned` always carries the projected totals (zero when the
/// projection has nothing for the month).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChartPoint {
    pub month: MonthKey,
    pub actual: Option<MonthlyTotal>,
    pub planned: MonthlyTotal,
}

/// Builds one point per window month from realized and projected totals.
pub fn build_chart_series(
    realized: &BTreeMap<MonthKey, MonthlyTotal>,
    projected: &BTreeMap<MonthKey, MonthlyTotal>,
    window: &DateWindow,
) -> Vec<ChartPoint> {
    window
        .month_keys()
        .into_iter()
        .map(|month| ChartPoint {
            month,
            actual: realized.get(&month).copied(),
            planned: projected.get(&month).copied().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_series_splits_actual_and_planned() {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );

        let mut realized = BTreeMap::new();
        realized.insert(
            MonthKey::new(2026, 1),
            MonthlyTotal {
                income_cents: 500_000,
                expenses_cents: 320_000,
            },
        );

        let mut projected = BTreeMap::new();
        projected.insert(
            MonthKey::new(2026, 2),
            MonthlyTotal {
                income_cents: 480_000,
                expenses_cents: 300_000,
            },
        );

        let series = build_chart_series(&realized, &projected, &window);
        assert_eq!(series.len(), 3);

        // January has realized data, no projection.
        assert!(series[0].actual.is_some());
        assert_eq!(series[0].planned, MonthlyTotal::default());

        // February is projection only.
        assert!(series[1].actual.is_none());
        assert_eq!(series[1].planned.income_cents, 480_000);

        // March has neither: planned defaults to zero.
        assert!(series[2].actual.is_none());
        assert_eq!(series[2].planned, MonthlyTotal::default());
    }
}
