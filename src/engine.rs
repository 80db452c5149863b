//! The projection orchestrator: validates the request, resolves realized
//! payments, runs every generator under a cooperative timeout budget, and
//! aggregates the merged output into per-month income/expense totals.

use crate::error::{ProjectionError, Result};
use crate::generate::{derived, recurring, scheduled, GenContext, PlanEntryIndex};
use crate::month::{months_between, DateWindow, MonthKey};
use crate::realized::RealizedPayments;
use crate::store::ProjectionStore;
use crate::{MonthlyTotal, ProjectionItem, ProjectionResult};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Hard cap on the projection horizon: 120 months (10 years).
pub const MAX_HORIZON_MONTHS: i32 = 120;

/// Runs projection generation against an injected persistence collaborator.
/// Construct once at process start and share; the engine holds no mutable
/// state of its own.
pub struct ProjectionEngine<S> {
    store: S,
}

impl<S: ProjectionStore> ProjectionEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generates projections for the window, degrading gracefully: a failing
    /// source type or an exceeded timeout budget produces a partial result
    /// with messages in `errors`, never a hard failure. Only caller mistakes
    /// (inverted range, horizon past the cap) return `Err`, and they do so
    /// before any collaborator query.
    pub fn generate(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        timeout: Option<Duration>,
    ) -> Result<ProjectionResult> {
        if start > end {
            return Err(ProjectionError::InvalidDateRange { start, end });
        }
        let horizon = months_between(start, end);
        if horizon > MAX_HORIZON_MONTHS {
            return Err(ProjectionError::HorizonTooLarge {
                months: horizon,
                max: MAX_HORIZON_MONTHS,
            });
        }
        let window = DateWindow::new(start, end);

        info!(
            "generating projections for user {user_id}: {} to {} ({} months)",
            start,
            end,
            window.months()
        );

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut errors = Vec::new();

        // The resolver must complete before any generator runs.
        let (realized, resolver_errors) = RealizedPayments::resolve(&self.store, user_id, &window);
        errors.extend(resolver_errors);

        let plan_entries = match self.store.plan_entries(user_id, &window) {
            Ok(entries) => PlanEntryIndex::build(entries),
            Err(err) => {
                warn!("plan-entry query failed: {err}");
                errors.push(format!("plan entries: {err}"));
                PlanEntryIndex::default()
            }
        };

        let ctx = GenContext {
            window: &window,
            plan_entries: &plan_entries,
            realized: &realized,
        };

        let mut projections: Vec<ProjectionItem> = Vec::new();
        let mut timed_out = false;

        #[allow(clippy::type_complexity)]
        let primaries: Vec<(&str, Box<dyn Fn() -> Result<Vec<ProjectionItem>> + '_>)> = vec![
            (
                "credit card bills",
                Box::new(|| {
                    Ok(scheduled::credit_card_bills(
                        &window,
                        &self.store.credit_card_bills(user_id, &window)?,
                    ))
                }),
            ),
            (
                "goals",
                Box::new(|| Ok(recurring::goals(&ctx, &self.store.goals(user_id)?))),
            ),
            (
                "debts",
                Box::new(|| Ok(recurring::debts(&ctx, &self.store.debts(user_id)?))),
            ),
            (
                "receivables",
                Box::new(|| {
                    Ok(recurring::receivables(
                        &ctx,
                        &self.store.receivables(user_id)?,
                    ))
                }),
            ),
            (
                "installments",
                Box::new(|| {
                    Ok(scheduled::installment_transactions(
                        &window,
                        &self.store.installment_transactions(user_id, &window)?,
                    ))
                }),
            ),
            (
                "investments",
                Box::new(|| {
                    Ok(recurring::investments(
                        &ctx,
                        &self.store.investments(user_id)?,
                    ))
                }),
            ),
        ];

        for (domain, run) in &primaries {
            if deadline_exceeded(deadline) {
                push_timeout_error(&mut errors, &mut timed_out);
                break;
            }
            match run() {
                Ok(items) => {
                    debug!("{domain}: {} items", items.len());
                    projections.extend(items);
                }
                Err(err) => {
                    warn!("{domain} generator failed: {err}");
                    errors.push(format!("{domain}: {err}"));
                }
            }
        }

        // Derived generators run strictly after the primaries: they read the
        // combined output through the balance simulation.
        if !timed_out {
            if deadline_exceeded(deadline) {
                push_timeout_error(&mut errors, &mut timed_out);
            } else {
                match self.store.accounts(user_id) {
                    Ok(accounts) => {
                        let balances =
                            derived::simulate_balances(&accounts, &projections, &window);
                        projections.extend(derived::overdraft_interest(
                            &accounts, &balances, &window,
                        ));
                        projections.extend(derived::account_yield(&accounts, &balances, &window));
                    }
                    Err(err) => {
                        warn!("account query failed: {err}");
                        errors.push(format!("accounts: {err}"));
                    }
                }
            }
        }

        let monthly_totals = aggregate_monthly(&projections);
        info!(
            "generated {} projections across {} months ({} errors)",
            projections.len(),
            monthly_totals.len(),
            errors.len()
        );

        Ok(ProjectionResult {
            projections,
            monthly_totals,
            errors,
        })
    }

    /// Cache-aware wrapper: serves a fresh-enough cached result, otherwise
    /// generates and stores. Degraded results are not cached so a transient
    /// collaborator failure is retried on the next load.
    pub fn generate_cached(
        &self,
        cache: &crate::cache::ProjectionCache,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        timeout: Option<Duration>,
    ) -> Result<ProjectionResult> {
        let start_month = MonthKey::from_date(start);
        let end_month = MonthKey::from_date(end);

        if let Some(cached) = cache.get(user_id, start_month, end_month) {
            debug!("projection cache hit for user {user_id}");
            return Ok(cached);
        }

        let result = self.generate(user_id, start, end, timeout)?;
        if !result.is_degraded() {
            cache.set(user_id, start_month, end_month, result.clone(), None);
        }
        Ok(result)
    }
}

fn deadline_exceeded(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn push_timeout_error(errors: &mut Vec<String>, timed_out: &mut bool) {
    if !*timed_out {
        errors.push(
            "projection timed out: remaining generators skipped, partial results returned"
                .to_string(),
        );
        *timed_out = true;
    }
}

/// Groups items by the month of their date, summing inflows into income and
/// the absolute value of outflows into expenses.
pub fn aggregate_monthly(items: &[ProjectionItem]) -> BTreeMap<MonthKey, MonthlyTotal> {
    let mut totals: BTreeMap<MonthKey, MonthlyTotal> = BTreeMap::new();
    for item in items {
        totals.entry(item.month()).or_default().add_amount(item.amount_cents);
    }
    totals
}
