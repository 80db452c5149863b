//! # Cashflow Projections
//!
//! A library for projecting a user's recurring financial obligations and assets
//! (goals, debts, receivables, investments, credit-card bills, installment
//! purchases, account overdraft/yield terms) into a time series of predicted
//! cash-flow events, deduplicated against already-realized payments and
//! aggregated into per-month income/expense totals.
//!
//! ## Core Concepts
//!
//! - **ProjectionItem**: a single predicted cash event with a deterministic id,
//!   signed amount in minor currency units (negative = outflow) and a source link
//! - **Plan Entry**: a manual per-month override that fully replaces
//!   frequency-derived generation for its source
//! - **Realized payment**: an already-recorded ledger row whose month suppresses
//!   the matching projected event
//! - **Graceful degradation**: one failing source type never fails the run;
//!   callers get partial results plus a visible error list
//!
//! ## Example
//!
//! ```rust,ignore
//! use cashflow_projections::*;
//! use chrono::NaiveDate;
//!
//! let store = MemoryStore::default(); // or any ProjectionStore implementation
//! let engine = ProjectionEngine::new(store);
//!
//! let result = engine.generate(
//!     "user-1",
//!     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
//!     None,
//! )?;
//!
//! for (month, totals) in &result.monthly_totals {
//!     println!("{month}: +{} / -{}", totals.income_cents, totals.expenses_cents);
//! }
//! ```

pub mod cache;
pub mod chart;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod generate;
pub mod month;
pub mod realized;
pub mod schema;
pub mod store;

pub use cache::{ProjectionCache, CACHE_VERSION, DEFAULT_CACHE_TTL};
pub use chart::{build_chart_series, ChartPoint};
pub use engine::{ProjectionEngine, MAX_HORIZON_MONTHS};
pub use error::{ProjectionError, Result};
pub use frequency::{
    monthly_equivalent_cents, next_occurrence, occurrences_per_month, should_include_in_month,
    Frequency,
};
pub use month::{DateWindow, MonthKey};
pub use realized::RealizedPayments;
pub use schema::*;
pub use store::{MemoryStore, ProjectionStore};

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The kind of cash event a projection represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionType {
    CreditCardBill,
    GoalContribution,
    DebtPayment,
    InvestmentContribution,
    Installment,
    ReceivablePayment,
    OverdraftInterest,
    AccountYield,
}

impl ProjectionType {
    /// Sign of the cash flow this type implies: -1 for outflows, +1 for inflows.
    pub fn direction(&self) -> i64 {
        match self {
            ProjectionType::ReceivablePayment | ProjectionType::AccountYield => 1,
            ProjectionType::CreditCardBill
            | ProjectionType::GoalContribution
            | ProjectionType::DebtPayment
            | ProjectionType::InvestmentContribution
            | ProjectionType::Installment
            | ProjectionType::OverdraftInterest => -1,
        }
    }
}

/// The domain entity a projection was derived from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Goal,
    Debt,
    Receivable,
    Investment,
    CreditCard,
    Installment,
    Overdraft,
    Yield,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Goal => "goal",
            SourceType::Debt => "debt",
            SourceType::Receivable => "receivable",
            SourceType::Investment => "investment",
            SourceType::CreditCard => "credit_card",
            SourceType::Installment => "installment",
            SourceType::Overdraft => "overdraft",
            SourceType::Yield => "yield",
        }
    }
}

/// A single predicted cash-flow event. Ephemeral: computed fresh per request
/// (or served from cache within TTL), never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionItem {
    /// Deterministic within and across runs: derived from the source id and
    /// month, so repeated generation yields stable ids for the same logical
    /// event.
    pub id: String,

    #[serde(rename = "type")]
    pub item_type: ProjectionType,

    /// The event's due or occurrence date.
    pub date: NaiveDate,

    pub description: String,

    /// Signed amount in minor currency units; negative = expense, positive =
    /// income.
    pub amount_cents: i64,

    pub category_id: Option<String>,
    pub category_name: Option<String>,

    pub source_type: SourceType,
    pub source_id: String,

    /// Source-specific context: remaining balance, installment number,
    /// frequency, linked account, and similar.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ProjectionItem {
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    /// The account this event settles against, when the source record links one.
    pub fn account_id(&self) -> Option<&str> {
        self.metadata.get("account_id").and_then(|v| v.as_str())
    }
}

/// Per-month income and expense totals in minor currency units. Both fields
/// are non-negative; expenses hold the absolute value of the outflows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyTotal {
    #[serde(rename = "income")]
    pub income_cents: i64,
    #[serde(rename = "expenses")]
    pub expenses_cents: i64,
}

impl MonthlyTotal {
    pub fn add_amount(&mut self, amount_cents: i64) {
        if amount_cents >= 0 {
            self.income_cents += amount_cents;
        } else {
            self.expenses_cents += -amount_cents;
        }
    }

    pub fn net_cents(&self) -> i64 {
        self.income_cents - self.expenses_cents
    }
}

/// The output of one projection run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionResult {
    /// All generated items, stable in generator execution order.
    pub projections: Vec<ProjectionItem>,

    /// Income/expense totals grouped by the item date's month key.
    pub monthly_totals: BTreeMap<MonthKey, MonthlyTotal>,

    /// Non-empty iff any generator failed or the timeout budget was exceeded.
    /// Callers must treat a non-empty list as "best-effort partial result".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ProjectionResult {
    pub fn is_degraded(&self) -> bool {
        !self.errors.is_empty()
    }

    /// JSON schema of the projection output, for consumers that feed the
    /// contract to downstream tooling.
    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = schemars::schema_for!(ProjectionResult);
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_per_type() {
        assert_eq!(ProjectionType::CreditCardBill.direction(), -1);
        assert_eq!(ProjectionType::GoalContribution.direction(), -1);
        assert_eq!(ProjectionType::DebtPayment.direction(), -1);
        assert_eq!(ProjectionType::InvestmentContribution.direction(), -1);
        assert_eq!(ProjectionType::Installment.direction(), -1);
        assert_eq!(ProjectionType::OverdraftInterest.direction(), -1);
        assert_eq!(ProjectionType::ReceivablePayment.direction(), 1);
        assert_eq!(ProjectionType::AccountYield.direction(), 1);
    }

    #[test]
    fn test_monthly_total_accumulates_by_sign() {
        let mut total = MonthlyTotal::default();
        total.add_amount(5_000);
        total.add_amount(-2_000);
        total.add_amount(-500);
        assert_eq!(total.income_cents, 5_000);
        assert_eq!(total.expenses_cents, 2_500);
        assert_eq!(total.net_cents(), 2_500);
    }

    #[test]
    fn test_projection_type_serializes_snake_case() {
        let json = serde_json::to_string(&ProjectionType::CreditCardBill).unwrap();
        assert_eq!(json, "\"credit_card_bill\"");
        let json = serde_json::to_string(&ProjectionType::OverdraftInterest).unwrap();
        assert_eq!(json, "\"overdraft_interest\"");
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ProjectionResult::schema_as_json().unwrap();
        assert!(schema_json.contains("projections"));
        assert!(schema_json.contains("monthly_totals"));
    }
}
