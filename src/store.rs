use crate::error::Result;
use crate::month::DateWindow;
use crate::schema::{
    Account, CreditCardBill, Debt, Goal, InstallmentTransaction, Investment, PlanEntry,
    RealizedPayment, Receivable,
};

/// Read-only view over the persistence collaborator. Every method is filtered
/// by `user_id`, and date-bounded queries additionally take the projection
/// window. This crate performs no writes.
pub trait ProjectionStore {
    fn goals(&self, user_id: &str) -> Result<Vec<Goal>>;
    fn debts(&self, user_id: &str) -> Result<Vec<Debt>>;
    fn receivables(&self, user_id: &str) -> Result<Vec<Receivable>>;
    fn investments(&self, user_id: &str) -> Result<Vec<Investment>>;
    fn accounts(&self, user_id: &str) -> Result<Vec<Account>>;

    fn credit_card_bills(&self, user_id: &str, window: &DateWindow)
        -> Result<Vec<CreditCardBill>>;
    fn installment_transactions(
        &self,
        user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<InstallmentTransaction>>;
    fn plan_entries(&self, user_id: &str, window: &DateWindow) -> Result<Vec<PlanEntry>>;

    // Realized-payment ledgers, one per source domain.
    fn goal_contributions(&self, user_id: &str, window: &DateWindow)
        -> Result<Vec<RealizedPayment>>;
    fn debt_payments(&self, user_id: &str, window: &DateWindow) -> Result<Vec<RealizedPayment>>;
    fn investment_purchases(
        &self,
        user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<RealizedPayment>>;
    fn receivable_payments(
        &self,
        user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<RealizedPayment>>;
}

/// In-memory `ProjectionStore` backed by plain vectors. Used by this crate's
/// tests and as a reference for host-side adapters.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub goals: Vec<Goal>,
    pub debts: Vec<Debt>,
    pub receivables: Vec<Receivable>,
    pub investments: Vec<Investment>,
    pub accounts: Vec<Account>,
    pub credit_card_bills: Vec<CreditCardBill>,
    pub installment_transactions: Vec<InstallmentTransaction>,
    pub plan_entries: Vec<PlanEntry>,
    pub goal_contributions: Vec<RealizedPayment>,
    pub debt_payments: Vec<RealizedPayment>,
    pub investment_purchases: Vec<RealizedPayment>,
    pub receivable_payments: Vec<RealizedPayment>,
}

impl MemoryStore {
    fn realized_in_window(rows: &[RealizedPayment], window: &DateWindow) -> Vec<RealizedPayment> {
        rows.iter()
            .filter(|r| window.contains(r.date))
            .cloned()
            .collect()
    }
}

impl ProjectionStore for MemoryStore {
    fn goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    fn debts(&self, user_id: &str) -> Result<Vec<Debt>> {
        Ok(self
            .debts
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect())
    }

    fn receivables(&self, user_id: &str) -> Result<Vec<Receivable>> {
        Ok(self
            .receivables
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn investments(&self, user_id: &str) -> Result<Vec<Investment>> {
        Ok(self
            .investments
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    fn accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn credit_card_bills(
        &self,
        user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<CreditCardBill>> {
        Ok(self
            .credit_card_bills
            .iter()
            .filter(|b| b.user_id == user_id && window.contains(b.due_date))
            .cloned()
            .collect())
    }

    fn installment_transactions(
        &self,
        user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<InstallmentTransaction>> {
        Ok(self
            .installment_transactions
            .iter()
            .filter(|t| t.user_id == user_id && window.contains(t.date))
            .cloned()
            .collect())
    }

    fn plan_entries(&self, user_id: &str, window: &DateWindow) -> Result<Vec<PlanEntry>> {
        let start = window.start_month();
        let end = window.end_month();
        Ok(self
            .plan_entries
            .iter()
            .filter(|e| e.user_id == user_id && e.entry_month >= start && e.entry_month <= end)
            .cloned()
            .collect())
    }

    fn goal_contributions(
        &self,
        _user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<RealizedPayment>> {
        Ok(Self::realized_in_window(&self.goal_contributions, window))
    }

    fn debt_payments(&self, _user_id: &str, window: &DateWindow) -> Result<Vec<RealizedPayment>> {
        Ok(Self::realized_in_window(&self.debt_payments, window))
    }

    fn investment_purchases(
        &self,
        _user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<RealizedPayment>> {
        Ok(Self::realized_in_window(&self.investment_purchases, window))
    }

    fn receivable_payments(
        &self,
        _user_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<RealizedPayment>> {
        Ok(Self::realized_in_window(&self.receivable_payments, window))
    }
}
