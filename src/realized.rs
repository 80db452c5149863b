use crate::month::{DateWindow, MonthKey};
use crate::schema::RealizedPayment;
use crate::store::ProjectionStore;
use crate::SourceType;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Months already covered by recorded payments, per source entity. Generators
/// consult these sets to suppress duplicate projections; the resolver must
/// complete before any generator runs.
#[derive(Debug, Clone, Default)]
pub struct RealizedPayments {
    pub goal_contributions: BTreeMap<String, BTreeSet<MonthKey>>,
    pub debt_payments: BTreeMap<String, BTreeSet<MonthKey>>,
    pub investment_purchases: BTreeMap<String, BTreeSet<MonthKey>>,
    pub receivable_payments: BTreeMap<String, BTreeSet<MonthKey>>,
}

impl RealizedPayments {
    /// Queries the four realized-event ledgers for the window. Each ledger is
    /// wrapped independently: a failing query contributes an error string and
    /// an empty map, never aborting the run.
    pub fn resolve<S: ProjectionStore>(
        store: &S,
        user_id: &str,
        window: &DateWindow,
    ) -> (Self, Vec<String>) {
        let mut resolved = Self::default();
        let mut errors = Vec::new();

        let ledgers: [(&str, crate::error::Result<Vec<RealizedPayment>>, &mut BTreeMap<String, BTreeSet<MonthKey>>); 4] = [
            (
                "goal contributions",
                store.goal_contributions(user_id, window),
                &mut resolved.goal_contributions,
            ),
            (
                "debt payments",
                store.debt_payments(user_id, window),
                &mut resolved.debt_payments,
            ),
            (
                "investment purchases",
                store.investment_purchases(user_id, window),
                &mut resolved.investment_purchases,
            ),
            (
                "receivable payments",
                store.receivable_payments(user_id, window),
                &mut resolved.receivable_payments,
            ),
        ];

        for (domain, rows, target) in ledgers {
            match rows {
                Ok(rows) => {
                    for row in rows {
                        target
                            .entry(row.source_id)
                            .or_default()
                            .insert(MonthKey::from_date(row.date));
                    }
                }
                Err(err) => {
                    warn!("realized-payment query failed for {domain}: {err}");
                    errors.push(format!("{domain}: {err}"));
                }
            }
        }

        debug!(
            "resolved suppression sets: {} goals, {} debts, {} investments, {} receivables",
            resolved.goal_contributions.len(),
            resolved.debt_payments.len(),
            resolved.investment_purchases.len(),
            resolved.receivable_payments.len()
        );

        (resolved, errors)
    }

    /// True when a realized payment already covers `month` for the given source.
    pub fn is_suppressed(&self, source_type: SourceType, source_id: &str, month: MonthKey) -> bool {
        let map = match source_type {
            SourceType::Goal => &self.goal_contributions,
            SourceType::Debt => &self.debt_payments,
            SourceType::Investment => &self.investment_purchases,
            SourceType::Receivable => &self.receivable_payments,
            // Bills, installments and derived sources have no realized ledger.
            _ => return false,
        };
        map.get(source_id).is_some_and(|months| months.contains(&month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn window() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        )
    }

    #[test]
    fn test_resolve_builds_month_sets_per_source() {
        let store = MemoryStore {
            debt_payments: vec![
                RealizedPayment {
                    source_id: "d1".into(),
                    date: NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
                    amount_cents: 10_000,
                },
                RealizedPayment {
                    source_id: "d1".into(),
                    date: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
                    amount_cents: 5_000,
                },
                RealizedPayment {
                    source_id: "d2".into(),
                    date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                    amount_cents: 7_000,
                },
            ],
            ..Default::default()
        };

        let (resolved, errors) = RealizedPayments::resolve(&store, "u1", &window());
        assert!(errors.is_empty());

        assert!(resolved.is_suppressed(SourceType::Debt, "d1", MonthKey::new(2026, 2)));
        assert!(!resolved.is_suppressed(SourceType::Debt, "d1", MonthKey::new(2026, 3)));
        assert!(resolved.is_suppressed(SourceType::Debt, "d2", MonthKey::new(2026, 3)));
        // Two same-month rows collapse into one suppressed month.
        assert_eq!(resolved.debt_payments.get("d1").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_store_yields_empty_maps() {
        let store = MemoryStore::default();
        let (resolved, errors) = RealizedPayments::resolve(&store, "u1", &window());
        assert!(errors.is_empty());
        assert!(resolved.goal_contributions.is_empty());
        assert!(!resolved.is_suppressed(SourceType::Goal, "g1", MonthKey::new(2026, 1)));
    }

    #[test]
    fn test_bills_never_suppressed() {
        let resolved = RealizedPayments::default();
        assert!(!resolved.is_suppressed(SourceType::CreditCard, "b1", MonthKey::new(2026, 1)));
    }
}
