use crate::frequency::Frequency;
use crate::month::MonthKey;
use crate::SourceType;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an obligation or asset record. Only `Active` records
/// participate in projection generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

/// How a recurring source pays down its balance, resolved once per record from
/// the dual-mode persistence fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PaymentPlan {
    /// A per-period amount on a recurrence cadence.
    Frequency {
        frequency: Frequency,
        amount_cents: i64,
    },
    /// Legacy fixed-installment terms: a known count of equal payments on a
    /// fixed day of the month.
    Installments {
        count: u32,
        amount_cents: i64,
        day_of_month: u32,
    },
}

/// The recurring-payment terms shared by goals, debts, receivables and
/// investments, mirroring the collaborator's dual-mode columns.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecurringTerms {
    #[schemars(
        description = "Full amount to be paid or received over the source's lifetime, in minor currency units. Absent for open-ended sources (e.g. an investment plan with no target)."
    )]
    pub total_amount_cents: Option<i64>,

    #[schemars(
        description = "Amount already settled against the total (paid, saved, received or invested), in minor currency units."
    )]
    pub settled_amount_cents: i64,

    pub start_date: NaiveDate,

    #[schemars(description = "Optional target or due date. Generation never projects past it.")]
    pub target_date: Option<NaiveDate>,

    pub contribution_frequency: Option<Frequency>,
    pub contribution_amount_cents: Option<i64>,

    // Legacy fixed-installment columns, used only when no frequency is set.
    pub installment_count: Option<u32>,
    pub installment_amount_cents: Option<i64>,
    pub payment_day: Option<u32>,
}

impl RecurringTerms {
    /// Resolves the dual-mode fields into a single tagged plan. Frequency mode
    /// wins when both sets of columns are populated; legacy installments are
    /// the fallback. `None` means the record carries no usable plan.
    pub fn payment_plan(&self) -> Option<PaymentPlan> {
        if let (Some(frequency), Some(amount_cents)) =
            (self.contribution_frequency, self.contribution_amount_cents)
        {
            if amount_cents > 0 {
                return Some(PaymentPlan::Frequency {
                    frequency,
                    amount_cents,
                });
            }
        }

        if let (Some(count), Some(amount_cents)) =
            (self.installment_count, self.installment_amount_cents)
        {
            if amount_cents > 0 && count > 0 {
                return Some(PaymentPlan::Installments {
                    count,
                    amount_cents,
                    day_of_month: self.payment_day.unwrap_or(self.start_date_day()),
                });
            }
        }

        None
    }

    /// Remaining balance at generation start; `None` when the source has no
    /// total and is therefore unbounded.
    pub fn remaining_cents(&self) -> Option<i64> {
        self.total_amount_cents
            .map(|total| total - self.settled_amount_cents)
    }

    fn start_date_day(&self) -> u32 {
        use chrono::Datelike;
        self.start_date.day()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    #[schemars(description = "Account the contributions are drawn from, when linked.")]
    pub account_id: Option<String>,
    pub include_in_plan: bool,
    pub status: SourceStatus,
    pub terms: RecurringTerms,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Debt {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub account_id: Option<String>,
    pub include_in_plan: bool,
    pub status: SourceStatus,
    pub terms: RecurringTerms,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Receivable {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub account_id: Option<String>,
    pub include_in_plan: bool,
    pub status: SourceStatus,
    pub terms: RecurringTerms,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Investment {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub account_id: Option<String>,
    pub include_in_plan: bool,
    pub status: SourceStatus,
    pub terms: RecurringTerms,
}

/// An already-issued credit-card bill. Due dates are computed by the
/// collaborator; unpaid bills inside the window project one-shot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreditCardBill {
    pub id: String,
    pub user_id: String,
    pub card_name: String,
    pub due_date: NaiveDate,
    #[schemars(description = "Bill total in minor currency units, positive magnitude.")]
    pub amount_cents: i64,
    pub paid: bool,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub account_id: Option<String>,
}

/// A single future installment of a purchase already split by the
/// collaborator. Dates are precomputed; no recurrence logic applies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallmentTransaction {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub date: NaiveDate,
    #[schemars(description = "Installment amount in minor currency units, positive magnitude.")]
    pub amount_cents: i64,
    pub installment_number: u32,
    pub installment_total: u32,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub balance_cents: i64,
    #[schemars(description = "Maximum overdraft magnitude in minor currency units.")]
    pub overdraft_limit_cents: Option<i64>,
    #[schemars(description = "Monthly overdraft interest rate as a percentage (5 = 5%).")]
    pub overdraft_monthly_rate_pct: Option<f64>,
    #[schemars(description = "Monthly yield rate as a percentage (0.8 = 0.8%).")]
    pub yield_monthly_rate_pct: Option<f64>,
}

impl Account {
    pub fn has_overdraft_terms(&self) -> bool {
        self.overdraft_limit_cents.is_some() && self.overdraft_monthly_rate_pct.is_some()
    }

    pub fn has_yield_terms(&self) -> bool {
        self.yield_monthly_rate_pct.map_or(false, |rate| rate > 0.0)
    }
}

/// A manual per-month override. When any entry exists for a source in the
/// window, entries fully replace frequency-derived generation for that source.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlanEntry {
    pub id: String,
    pub user_id: String,
    pub source_type: SourceType,
    pub source_id: String,
    pub entry_month: MonthKey,
    #[schemars(description = "Override amount in minor currency units, positive magnitude.")]
    pub amount_cents: i64,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

/// A historical ledger row (contribution, payment or buy-transaction) used
/// only to suppress duplicate projections. Never mutated by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RealizedPayment {
    pub source_id: String,
    pub date: NaiveDate,
    pub amount_cents: i64,
}
