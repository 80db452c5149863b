//! One-shot generators: credit-card bills and installment transactions carry
//! precomputed dates from the collaborator, so no recurrence logic applies.

use crate::generate::row_item_id;
use crate::month::DateWindow;
use crate::schema::{CreditCardBill, InstallmentTransaction};
use crate::{ProjectionItem, ProjectionType, SourceType};
use serde_json::json;
use std::collections::BTreeMap;

/// One item per unpaid bill whose due date falls inside the window.
pub fn credit_card_bills(window: &DateWindow, bills: &[CreditCardBill]) -> Vec<ProjectionItem> {
    bills
        .iter()
        .filter(|b| !b.paid && window.contains(b.due_date) && b.amount_cents > 0)
        .map(|b| {
            let mut metadata = BTreeMap::new();
            metadata.insert("card_name".into(), json!(b.card_name));
            if let Some(account_id) = &b.account_id {
                metadata.insert("account_id".into(), json!(account_id));
            }
            ProjectionItem {
                id: row_item_id(SourceType::CreditCard, &b.id),
                item_type: ProjectionType::CreditCardBill,
                date: b.due_date,
                description: format!("Credit card bill: {}", b.card_name),
                amount_cents: -b.amount_cents,
                category_id: b.category_id.clone(),
                category_name: b.category_name.clone(),
                source_type: SourceType::CreditCard,
                source_id: b.id.clone(),
                metadata,
            }
        })
        .collect()
}

/// One item per scheduled installment row whose date falls inside the window.
pub fn installment_transactions(
    window: &DateWindow,
    transactions: &[InstallmentTransaction],
) -> Vec<ProjectionItem> {
    transactions
        .iter()
        .filter(|t| window.contains(t.date) && t.amount_cents > 0)
        .map(|t| {
            let mut metadata = BTreeMap::new();
            metadata.insert("installment_number".into(), json!(t.installment_number));
            metadata.insert("installment_count".into(), json!(t.installment_total));
            if let Some(account_id) = &t.account_id {
                metadata.insert("account_id".into(), json!(account_id));
            }
            ProjectionItem {
                id: row_item_id(SourceType::Installment, &t.id),
                item_type: ProjectionType::Installment,
                date: t.date,
                description: format!(
                    "{} ({}/{})",
                    t.description, t.installment_number, t.installment_total
                ),
                amount_cents: -t.amount_cents,
                category_id: t.category_id.clone(),
                category_name: t.category_name.clone(),
                source_type: SourceType::Installment,
                source_id: t.id.clone(),
                metadata,
            }
        })
        .collect()
}
