//! Derived generators: overdraft interest and account yield.
//!
//! Both depend on the combined output of the primary generators, so they run
//! as an explicit second phase: first the end-of-month balance of each account
//! is simulated from its opening balance plus the projected items linked to
//! it, then interest or yield is compounded on that snapshot. Mid-month
//! interleaving is not modeled; balances are end-of-month snapshots only.

use crate::generate::item_id;
use crate::month::{days_in_month, DateWindow, MonthKey};
use crate::schema::Account;
use crate::{ProjectionItem, ProjectionType, SourceType};
use serde_json::json;
use std::collections::BTreeMap;

/// End-of-month balance snapshots for one account over the window, before
/// interest or yield is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceProjection {
    pub account_id: String,
    pub end_of_month_cents: BTreeMap<MonthKey, i64>,
}

/// Simulates each account's end-of-month balance across the window: the
/// opening balance plus the running sum of projected items linked to the
/// account via their `account_id` metadata. Items with no account link touch
/// no account.
pub fn simulate_balances(
    accounts: &[Account],
    items: &[ProjectionItem],
    window: &DateWindow,
) -> Vec<BalanceProjection> {
    let mut monthly_deltas: BTreeMap<&str, BTreeMap<MonthKey, i64>> = BTreeMap::new();
    for item in items {
        if let Some(account_id) = item.account_id() {
            *monthly_deltas
                .entry(account_id)
                .or_default()
                .entry(item.month())
                .or_default() += item.amount_cents;
        }
    }

    accounts
        .iter()
        .map(|account| {
            let deltas = monthly_deltas.get(account.id.as_str());
            let mut running = account.balance_cents;
            let mut end_of_month = BTreeMap::new();
            for month in window.month_keys() {
                if let Some(delta) = deltas.and_then(|d| d.get(&month)) {
                    running += delta;
                }
                end_of_month.insert(month, running);
            }
            BalanceProjection {
                account_id: account.id.clone(),
                end_of_month_cents: end_of_month,
            }
        })
        .collect()
}

/// Monthly compounding factor for a monthly percentage rate applied across the
/// days of one month: `daily = (1 + monthly)^(1/30) - 1`, compounded daily.
fn compound_factor(monthly_rate_pct: f64, days: u32) -> f64 {
    let monthly = monthly_rate_pct / 100.0;
    let daily = (1.0 + monthly).powf(1.0 / 30.0) - 1.0;
    (1.0 + daily).powi(days as i32) - 1.0
}

/// Projects overdraft interest for every account with overdraft terms: each
/// window month with a negative end-of-month balance yields one negative item
/// dated the first of the following month, clamped so the balance magnitude
/// never exceeds the overdraft limit. Interest charges feed back into the
/// balance of subsequent months.
pub fn overdraft_interest(
    accounts: &[Account],
    balances: &[BalanceProjection],
    window: &DateWindow,
) -> Vec<ProjectionItem> {
    let mut items = Vec::new();

    for account in accounts.iter().filter(|a| a.has_overdraft_terms()) {
        let (Some(limit), Some(rate)) =
            (account.overdraft_limit_cents, account.overdraft_monthly_rate_pct)
        else {
            continue;
        };
        let Some(balance) = balances.iter().find(|b| b.account_id == account.id) else {
            continue;
        };

        let mut accrued: i64 = 0;
        for month in window.month_keys() {
            let Some(&base) = balance.end_of_month_cents.get(&month) else {
                continue;
            };
            let effective = base + accrued;
            if effective >= 0 {
                continue;
            }

            let overdrawn = -effective;
            let factor = compound_factor(rate, days_in_month(month.year, month.month));
            let raw = (overdrawn as f64 * factor).round() as i64;
            // Charging past the limit is clamped away entirely.
            let interest = raw.min((limit - overdrawn).max(0));
            if interest <= 0 {
                continue;
            }
            accrued -= interest;

            let due = month.next();
            let mut metadata = BTreeMap::new();
            metadata.insert("account_id".into(), json!(account.id));
            metadata.insert("end_of_month_balance_cents".into(), json!(effective));
            metadata.insert("monthly_rate_pct".into(), json!(rate));

            items.push(ProjectionItem {
                id: item_id(SourceType::Overdraft, &account.id, due),
                item_type: ProjectionType::OverdraftInterest,
                date: due.first_day(),
                description: format!("Overdraft interest: {}", account.name),
                amount_cents: -interest,
                category_id: None,
                category_name: None,
                source_type: SourceType::Overdraft,
                source_id: account.id.clone(),
                metadata,
            });
        }
    }

    items
}

/// Projects yield for every account with a positive monthly rate: each window
/// month with a positive end-of-month balance yields one positive item dated
/// the first of the following month. Earned yield compounds into the balance
/// of subsequent months.
pub fn account_yield(
    accounts: &[Account],
    balances: &[BalanceProjection],
    window: &DateWindow,
) -> Vec<ProjectionItem> {
    let mut items = Vec::new();

    for account in accounts.iter().filter(|a| a.has_yield_terms()) {
        let Some(rate) = account.yield_monthly_rate_pct else {
            continue;
        };
        let Some(balance) = balances.iter().find(|b| b.account_id == account.id) else {
            continue;
        };

        let mut accrued: i64 = 0;
        for month in window.month_keys() {
            let Some(&base) = balance.end_of_month_cents.get(&month) else {
                continue;
            };
            let effective = base + accrued;
            if effective <= 0 {
                continue;
            }

            let factor = compound_factor(rate, days_in_month(month.year, month.month));
            let earned = (effective as f64 * factor).round() as i64;
            if earned <= 0 {
                continue;
            }
            accrued += earned;

            let due = month.next();
            let mut metadata = BTreeMap::new();
            metadata.insert("account_id".into(), json!(account.id));
            metadata.insert("end_of_month_balance_cents".into(), json!(effective));
            metadata.insert("monthly_rate_pct".into(), json!(rate));

            items.push(ProjectionItem {
                id: item_id(SourceType::Yield, &account.id, due),
                item_type: ProjectionType::AccountYield,
                date: due.first_day(),
                description: format!("Account yield: {}", account.name),
                amount_cents: earned,
                category_id: None,
                category_name: None,
                source_type: SourceType::Yield,
                source_id: account.id.clone(),
                metadata,
            });
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account(balance: i64) -> Account {
        Account {
            id: "acc1".into(),
            user_id: "u1".into(),
            name: "Checking".into(),
            balance_cents: balance,
            overdraft_limit_cents: Some(50_000),
            overdraft_monthly_rate_pct: Some(5.0),
            yield_monthly_rate_pct: None,
        }
    }

    fn synthetic_balance(months: &[(MonthKey, i64)]) -> BalanceProjection {
        BalanceProjection {
            account_id: "acc1".into(),
            end_of_month_cents: months.iter().cloned().collect(),
        }
    }

    #[test]
    fn test_simulate_balances_folds_linked_items() {
        let window = DateWindow::new(date(2026, 1, 1), date(2026, 3, 31));
        let accounts = vec![account(10_000)];

        let mut metadata = BTreeMap::new();
        metadata.insert("account_id".into(), json!("acc1"));
        let items = vec![ProjectionItem {
            id: "debt:d1:2026-02".into(),
            item_type: ProjectionType::DebtPayment,
            date: date(2026, 2, 5),
            description: "Debt payment".into(),
            amount_cents: -30_000,
            category_id: None,
            category_name: None,
            source_type: SourceType::Debt,
            source_id: "d1".into(),
            metadata,
        }];

        let balances = simulate_balances(&accounts, &items, &window);
        assert_eq!(balances.len(), 1);
        let eom = &balances[0].end_of_month_cents;
        assert_eq!(eom[&MonthKey::new(2026, 1)], 10_000);
        assert_eq!(eom[&MonthKey::new(2026, 2)], -20_000);
        assert_eq!(eom[&MonthKey::new(2026, 3)], -20_000);
    }

    #[test]
    fn test_items_without_account_link_touch_nothing() {
        let window = DateWindow::new(date(2026, 1, 1), date(2026, 2, 28));
        let items = vec![ProjectionItem {
            id: "goal:g1:2026-01".into(),
            item_type: ProjectionType::GoalContribution,
            date: date(2026, 1, 10),
            description: "Goal".into(),
            amount_cents: -5_000,
            category_id: None,
            category_name: None,
            source_type: SourceType::Goal,
            source_id: "g1".into(),
            metadata: BTreeMap::new(),
        }];

        let balances = simulate_balances(&[account(10_000)], &items, &window);
        assert!(balances[0]
            .end_of_month_cents
            .values()
            .all(|&b| b == 10_000));
    }

    #[test]
    fn test_overdraft_interest_on_negative_balance() {
        // April 2026 has 30 days, so daily compounding lands exactly on the
        // 5% monthly rate: 20_000 * 0.05 = 1_000.
        let window = DateWindow::new(date(2026, 4, 1), date(2026, 4, 30));
        let balances = vec![synthetic_balance(&[(MonthKey::new(2026, 4), -20_000)])];

        let items = overdraft_interest(&[account(0)], &balances, &window);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount_cents, -1_000);
        assert_eq!(items[0].date, date(2026, 5, 1));
        assert_eq!(items[0].id, "overdraft:acc1:2026-05");
        assert_eq!(items[0].item_type, ProjectionType::OverdraftInterest);
    }

    #[test]
    fn test_overdraft_interest_clamped_at_limit() {
        // 49_500 overdrawn at 5% would accrue 2_475, but only 500 fits under
        // the 50_000 limit.
        let window = DateWindow::new(date(2026, 4, 1), date(2026, 4, 30));
        let balances = vec![synthetic_balance(&[(MonthKey::new(2026, 4), -49_500)])];

        let items = overdraft_interest(&[account(0)], &balances, &window);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount_cents, -500);
    }

    #[test]
    fn test_overdraft_at_limit_emits_nothing() {
        let window = DateWindow::new(date(2026, 4, 1), date(2026, 4, 30));
        let balances = vec![synthetic_balance(&[(MonthKey::new(2026, 4), -50_000)])];
        assert!(overdraft_interest(&[account(0)], &balances, &window).is_empty());
    }

    #[test]
    fn test_overdraft_charges_compound_into_later_months() {
        // Both April and June have 30 days. May's interest deepens the June
        // balance before June's charge is computed.
        let window = DateWindow::new(date(2026, 4, 1), date(2026, 6, 30));
        let balances = vec![synthetic_balance(&[
            (MonthKey::new(2026, 4), -20_000),
            (MonthKey::new(2026, 5), -20_000),
            (MonthKey::new(2026, 6), -20_000),
        ])];

        let items = overdraft_interest(&[account(0)], &balances, &window);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].amount_cents, -1_000);
        // Later charges grow as accrued interest deepens the overdraft.
        assert!(items[1].amount_cents <= items[0].amount_cents);
        assert!(items[2].amount_cents <= items[1].amount_cents);
    }

    #[test]
    fn test_positive_balance_accrues_no_overdraft() {
        let window = DateWindow::new(date(2026, 4, 1), date(2026, 4, 30));
        let balances = vec![synthetic_balance(&[(MonthKey::new(2026, 4), 20_000)])];
        assert!(overdraft_interest(&[account(0)], &balances, &window).is_empty());
    }

    #[test]
    fn test_account_yield_on_positive_balance() {
        let mut acct = account(0);
        acct.overdraft_limit_cents = None;
        acct.overdraft_monthly_rate_pct = None;
        acct.yield_monthly_rate_pct = Some(1.0);

        // 1% on 100_000 over a 30-day month = 1_000.
        let window = DateWindow::new(date(2026, 4, 1), date(2026, 4, 30));
        let balances = vec![synthetic_balance(&[(MonthKey::new(2026, 4), 100_000)])];

        let items = account_yield(&[acct], &balances, &window);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount_cents, 1_000);
        assert_eq!(items[0].date, date(2026, 5, 1));
        assert_eq!(items[0].item_type, ProjectionType::AccountYield);
    }

    #[test]
    fn test_yield_requires_positive_rate_and_balance() {
        let mut acct = account(0);
        acct.yield_monthly_rate_pct = Some(0.0);
        let window = DateWindow::new(date(2026, 4, 1), date(2026, 4, 30));
        let balances = vec![synthetic_balance(&[(MonthKey::new(2026, 4), 100_000)])];
        assert!(account_yield(&[acct.clone()], &balances, &window).is_empty());

        acct.yield_monthly_rate_pct = Some(1.0);
        let negative = vec![synthetic_balance(&[(MonthKey::new(2026, 4), -100_000)])];
        assert!(account_yield(&[acct], &negative, &window).is_empty());
    }
}
