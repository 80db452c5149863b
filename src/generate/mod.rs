//! Per-source projection generators.
//!
//! The six primary generators (credit-card bills, goals, debts, receivables,
//! installment transactions, investment contributions) are independent of each
//! other. The two derived generators (overdraft interest, account yield) run
//! strictly after them, over the combined primary output.

pub mod derived;
pub mod recurring;
pub mod scheduled;

use crate::month::{DateWindow, MonthKey};
use crate::realized::RealizedPayments;
use crate::schema::PlanEntry;
use crate::SourceType;
use std::collections::BTreeMap;

/// Manual per-month overrides indexed by source, window-filtered at fetch time.
#[derive(Debug, Clone, Default)]
pub struct PlanEntryIndex {
    entries: BTreeMap<(SourceType, String), Vec<PlanEntry>>,
}

impl PlanEntryIndex {
    pub fn build(entries: Vec<PlanEntry>) -> Self {
        let mut index: BTreeMap<(SourceType, String), Vec<PlanEntry>> = BTreeMap::new();
        for entry in entries {
            index
                .entry((entry.source_type, entry.source_id.clone()))
                .or_default()
                .push(entry);
        }
        for entries in index.values_mut() {
            entries.sort_by_key(|e| e.entry_month);
        }
        Self { entries: index }
    }

    pub fn for_source(&self, source_type: SourceType, source_id: &str) -> &[PlanEntry] {
        self.entries
            .get(&(source_type, source_id.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Shared read-only state every generator consults.
pub struct GenContext<'a> {
    pub window: &'a DateWindow,
    pub plan_entries: &'a PlanEntryIndex,
    pub realized: &'a RealizedPayments,
}

/// Deterministic item id: same source and month always map to the same id
/// across runs.
pub(crate) fn item_id(source_type: SourceType, source_id: &str, month: MonthKey) -> String {
    format!("{}:{}:{}", source_type.as_str(), source_id, month)
}

/// Id for one-shot rows (bills, scheduled installments) that are already
/// unique without a month component.
pub(crate) fn row_item_id(source_type: SourceType, row_id: &str) -> String {
    format!("{}:{}", source_type.as_str(), row_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_entry_index_groups_and_sorts() {
        let entry = |id: &str, month: u32| PlanEntry {
            id: id.into(),
            user_id: "u1".into(),
            source_type: SourceType::Debt,
            source_id: "d1".into(),
            entry_month: MonthKey::new(2026, month),
            amount_cents: 1_000,
            description: None,
            category_id: None,
            category_name: None,
        };

        let index = PlanEntryIndex::build(vec![entry("e2", 5), entry("e1", 2)]);
        let entries = index.for_source(SourceType::Debt, "d1");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entry_month, MonthKey::new(2026, 2));
        assert!(index.for_source(SourceType::Goal, "d1").is_empty());
    }

    #[test]
    fn test_item_ids_are_deterministic() {
        assert_eq!(
            item_id(SourceType::Debt, "d1", MonthKey::new(2026, 3)),
            "debt:d1:2026-03"
        );
        assert_eq!(row_item_id(SourceType::CreditCard, "b9"), "credit_card:b9");
    }
}
