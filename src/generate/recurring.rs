//! Generators for the four recurring source domains: goals, debts,
//! receivables and investment contributions. All four resolve into a common
//! `RecurringSource` and share one generation skeleton:
//!
//! 1. Skip inactive or fully-settled sources.
//! 2. Plan entries inside the window replace frequency generation entirely.
//! 3. Frequency plans iterate month-by-month, clamped to the remaining
//!    balance and stopped at the target date.
//! 4. Legacy fixed-installment terms are the fallback.

use crate::frequency::should_include_in_month;
use crate::generate::{item_id, GenContext};
use crate::month::{date_in_month, MonthKey};
use crate::schema::{Debt, Goal, Investment, PaymentPlan, PlanEntry, Receivable, SourceStatus};
use crate::{ProjectionItem, ProjectionType, SourceType};
use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A recurring obligation or asset reduced to the fields the shared skeleton
/// needs, with the dual-mode plan columns already resolved.
pub(crate) struct RecurringSource {
    pub source_type: SourceType,
    pub item_type: ProjectionType,
    pub source_id: String,
    pub description: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub account_id: Option<String>,
    /// `None` = unbounded (no total configured).
    pub remaining_cents: Option<i64>,
    pub settled_cents: i64,
    pub plan: Option<PaymentPlan>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

pub fn goals(ctx: &GenContext, goals: &[Goal]) -> Vec<ProjectionItem> {
    goals
        .iter()
        .filter(|g| g.include_in_plan && g.status == SourceStatus::Active)
        .flat_map(|g| {
            project(
                ctx,
                &RecurringSource {
                    source_type: SourceType::Goal,
                    item_type: ProjectionType::GoalContribution,
                    source_id: g.id.clone(),
                    description: format!("Goal contribution: {}", g.name),
                    category_id: g.category_id.clone(),
                    category_name: g.category_name.clone(),
                    account_id: g.account_id.clone(),
                    remaining_cents: g.terms.remaining_cents(),
                    settled_cents: g.terms.settled_amount_cents,
                    plan: g.terms.payment_plan(),
                    start_date: g.terms.start_date,
                    end_date: g.terms.target_date,
                },
            )
        })
        .collect()
}

pub fn debts(ctx: &GenContext, debts: &[Debt]) -> Vec<ProjectionItem> {
    debts
        .iter()
        .filter(|d| d.include_in_plan && d.status == SourceStatus::Active)
        .flat_map(|d| {
            project(
                ctx,
                &RecurringSource {
                    source_type: SourceType::Debt,
                    item_type: ProjectionType::DebtPayment,
                    source_id: d.id.clone(),
                    description: format!("Debt payment: {}", d.name),
                    category_id: d.category_id.clone(),
                    category_name: d.category_name.clone(),
                    account_id: d.account_id.clone(),
                    remaining_cents: d.terms.remaining_cents(),
                    settled_cents: d.terms.settled_amount_cents,
                    plan: d.terms.payment_plan(),
                    start_date: d.terms.start_date,
                    end_date: d.terms.target_date,
                },
            )
        })
        .collect()
}

pub fn receivables(ctx: &GenContext, receivables: &[Receivable]) -> Vec<ProjectionItem> {
    receivables
        .iter()
        .filter(|r| r.include_in_plan && r.status == SourceStatus::Active)
        .flat_map(|r| {
            project(
                ctx,
                &RecurringSource {
                    source_type: SourceType::Receivable,
                    item_type: ProjectionType::ReceivablePayment,
                    source_id: r.id.clone(),
                    description: format!("Receivable payment: {}", r.name),
                    category_id: r.category_id.clone(),
                    category_name: r.category_name.clone(),
                    account_id: r.account_id.clone(),
                    remaining_cents: r.terms.remaining_cents(),
                    settled_cents: r.terms.settled_amount_cents,
                    plan: r.terms.payment_plan(),
                    start_date: r.terms.start_date,
                    end_date: r.terms.target_date,
                },
            )
        })
        .collect()
}

pub fn investments(ctx: &GenContext, investments: &[Investment]) -> Vec<ProjectionItem> {
    investments
        .iter()
        .filter(|i| i.include_in_plan && i.status == SourceStatus::Active)
        .flat_map(|i| {
            project(
                ctx,
                &RecurringSource {
                    source_type: SourceType::Investment,
                    item_type: ProjectionType::InvestmentContribution,
                    source_id: i.id.clone(),
                    description: format!("Investment contribution: {}", i.name),
                    category_id: i.category_id.clone(),
                    category_name: i.category_name.clone(),
                    account_id: i.account_id.clone(),
                    remaining_cents: i.terms.remaining_cents(),
                    settled_cents: i.terms.settled_amount_cents,
                    plan: i.terms.payment_plan(),
                    start_date: i.terms.start_date,
                    end_date: i.terms.target_date,
                },
            )
        })
        .collect()
}

pub(crate) fn project(ctx: &GenContext, src: &RecurringSource) -> Vec<ProjectionItem> {
    if matches!(src.remaining_cents, Some(r) if r <= 0) {
        return Vec::new();
    }

    // Manual overrides replace frequency generation for the source entirely.
    let entries = ctx.plan_entries.for_source(src.source_type, &src.source_id);
    if !entries.is_empty() {
        return project_plan_entries(ctx, src, entries);
    }

    match src.plan {
        Some(PaymentPlan::Frequency {
            frequency,
            amount_cents,
        }) => project_frequency(ctx, src, frequency, amount_cents),
        Some(PaymentPlan::Installments {
            count,
            amount_cents,
            day_of_month,
        }) => project_installments(ctx, src, count, amount_cents, day_of_month),
        None => Vec::new(),
    }
}

fn project_plan_entries(
    ctx: &GenContext,
    src: &RecurringSource,
    entries: &[PlanEntry],
) -> Vec<ProjectionItem> {
    let direction = src.item_type.direction();
    let anchor_day = src.start_date.day();
    let mut remaining = src.remaining_cents;
    let mut items = Vec::new();

    for e in entries {
        if e.amount_cents <= 0 {
            continue;
        }
        if ctx
            .realized
            .is_suppressed(src.source_type, &src.source_id, e.entry_month)
        {
            continue;
        }

        // Overrides replace the cadence, not the balance: the remaining
        // tracker still clamps them.
        let amount = match remaining {
            Some(r) => e.amount_cents.min(r),
            None => e.amount_cents,
        };
        if amount <= 0 {
            break;
        }
        if let Some(r) = remaining.as_mut() {
            *r -= amount;
        }

        let mut metadata = base_metadata(src);
        metadata.insert("plan_entry_id".into(), json!(e.id));
        if let Some(r) = remaining {
            metadata.insert("remaining_cents".into(), json!(r));
        }

        // The entry id keeps same-month entries distinct.
        items.push(ProjectionItem {
            id: format!(
                "{}:{}",
                item_id(src.source_type, &src.source_id, e.entry_month),
                e.id
            ),
            item_type: src.item_type,
            date: date_in_month(e.entry_month, anchor_day),
            description: e
                .description
                .clone()
                .unwrap_or_else(|| src.description.clone()),
            amount_cents: direction * amount,
            category_id: e.category_id.clone().or_else(|| src.category_id.clone()),
            category_name: e
                .category_name
                .clone()
                .or_else(|| src.category_name.clone()),
            source_type: src.source_type,
            source_id: src.source_id.clone(),
            metadata,
        });

        if matches!(remaining, Some(r) if r <= 0) {
            break;
        }
    }

    items
}

fn project_frequency(
    ctx: &GenContext,
    src: &RecurringSource,
    frequency: crate::Frequency,
    per_period_cents: i64,
) -> Vec<ProjectionItem> {
    let direction = src.item_type.direction();
    let anchor_day = src.start_date.day();
    let end_month = src.end_date.map(MonthKey::from_date);
    let mut remaining = src.remaining_cents;
    let mut items = Vec::new();

    for month in ctx.window.month_keys() {
        if let Some(end) = end_month {
            if month > end {
                break;
            }
        }
        if !should_include_in_month(frequency, src.start_date, month) {
            continue;
        }
        if ctx
            .realized
            .is_suppressed(src.source_type, &src.source_id, month)
        {
            continue;
        }

        // Last payment clamps to whatever balance is left.
        let amount = match remaining {
            Some(r) => per_period_cents.min(r),
            None => per_period_cents,
        };
        if amount <= 0 {
            break;
        }
        if let Some(r) = remaining.as_mut() {
            *r -= amount;
        }

        // The anchor day in the first window month can land before the
        // source's start or the window itself; bound it to both.
        let date = date_in_month(month, anchor_day)
            .max(src.start_date)
            .max(ctx.window.start);

        let mut metadata = base_metadata(src);
        metadata.insert("frequency".into(), json!(frequency));
        if let Some(r) = remaining {
            metadata.insert("remaining_cents".into(), json!(r));
        }

        items.push(ProjectionItem {
            id: item_id(src.source_type, &src.source_id, month),
            item_type: src.item_type,
            date,
            description: src.description.clone(),
            amount_cents: direction * amount,
            category_id: src.category_id.clone(),
            category_name: src.category_name.clone(),
            source_type: src.source_type,
            source_id: src.source_id.clone(),
            metadata,
        });

        if matches!(remaining, Some(r) if r <= 0) {
            break;
        }
    }

    items
}

fn project_installments(
    ctx: &GenContext,
    src: &RecurringSource,
    count: u32,
    per_installment_cents: i64,
    day_of_month: u32,
) -> Vec<ProjectionItem> {
    let direction = src.item_type.direction();
    let anchor_month = MonthKey::from_date(src.start_date);
    let settled_count = if per_installment_cents > 0 {
        (src.settled_cents / per_installment_cents).max(0) as u32
    } else {
        0
    };
    let mut remaining = src.remaining_cents;
    let mut items = Vec::new();

    for index in settled_count..count {
        let month = anchor_month.add_months(index as i32);
        let date = date_in_month(month, day_of_month);
        if date > ctx.window.end {
            break;
        }
        if date < ctx.window.start {
            continue;
        }
        if ctx
            .realized
            .is_suppressed(src.source_type, &src.source_id, month)
        {
            continue;
        }

        let amount = match remaining {
            Some(r) => per_installment_cents.min(r),
            None => per_installment_cents,
        };
        if amount <= 0 {
            break;
        }
        if let Some(r) = remaining.as_mut() {
            *r -= amount;
        }

        let mut metadata = base_metadata(src);
        metadata.insert("installment_number".into(), json!(index + 1));
        metadata.insert("installment_count".into(), json!(count));

        items.push(ProjectionItem {
            id: item_id(src.source_type, &src.source_id, month),
            item_type: src.item_type,
            date,
            description: src.description.clone(),
            amount_cents: direction * amount,
            category_id: src.category_id.clone(),
            category_name: src.category_name.clone(),
            source_type: src.source_type,
            source_id: src.source_id.clone(),
            metadata,
        });

        if matches!(remaining, Some(r) if r <= 0) {
            break;
        }
    }

    items
}

fn base_metadata(src: &RecurringSource) -> BTreeMap<String, Value> {
    let mut metadata = BTreeMap::new();
    if let Some(account_id) = &src.account_id {
        metadata.insert("account_id".into(), json!(account_id));
    }
    metadata
}
