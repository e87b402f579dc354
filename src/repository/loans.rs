//! Loans repository: circulation against the shared registry

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::loan::{Loan, LoanDetails, LoanScope},
};

use super::Store;

#[derive(Clone)]
pub struct LoansRepository {
    store: Store,
}

impl LoansRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Lend a copy. With `settle_fines`, the member's outstanding balance is
    /// paid in full first, under the same lock. Returns the loan and the
    /// amount settled.
    pub async fn create(
        &self,
        member_id: &str,
        copy_id: u32,
        date: NaiveDate,
        settle_fines: bool,
    ) -> AppResult<(Loan, Decimal)> {
        let mut library = self.store.write().await;
        let member = library.member(member_id)?;
        let owed = member.amount_owed;
        let quota_reached = member.quota_reached(library.policy());

        let settled = if settle_fines && owed > Decimal::ZERO {
            // a borrow that would fail anyway must not take the payment
            let copy_free = library.search_copy(copy_id).map(|c| c.available());
            if copy_free == Some(true) && !quota_reached {
                library.pay(member_id, owed)?;
                owed
            } else {
                Decimal::ZERO
            }
        } else {
            Decimal::ZERO
        };

        let loan = library.borrow(member_id, copy_id, date)?;
        Ok((loan, settled))
    }

    pub async fn renew(&self, member_id: &str, title: &str, date: NaiveDate) -> AppResult<Loan> {
        self.store.write().await.renew(member_id, title, date)
    }

    pub async fn return_item(&self, member_id: &str, title: &str, date: NaiveDate) -> AppResult<(Loan, Decimal)> {
        let mut library = self.store.write().await;
        let loan = library.return_item(member_id, title, date)?;
        let owed = library.member(member_id)?.amount_owed;
        Ok((loan, owed))
    }

    pub async fn report_lost(&self, member_id: &str, title: &str, date: NaiveDate) -> AppResult<(Loan, Decimal)> {
        let mut library = self.store.write().await;
        let loan = library.report_lost(member_id, title, date)?;
        let owed = library.member(member_id)?.amount_owed;
        Ok((loan, owed))
    }

    /// Returns the change and the remaining balance
    pub async fn pay(&self, member_id: &str, amount: Decimal) -> AppResult<(Decimal, Decimal)> {
        let mut library = self.store.write().await;
        let change = library.pay(member_id, amount)?;
        let owed = library.member(member_id)?.amount_owed;
        Ok((change, owed))
    }

    pub async fn member_loans(&self, member_id: &str, scope: LoanScope, today: NaiveDate) -> AppResult<Vec<LoanDetails>> {
        let library = self.store.read().await;
        let member = library.member(member_id)?;
        let loans = match scope {
            LoanScope::Present => member.present_loans(None),
            LoanScope::Past => member.past_loans(None),
            LoanScope::All => member.loans.iter().collect(),
        };
        Ok(loans
            .into_iter()
            .map(|l| LoanDetails::new(l, &member.member_id, today))
            .collect())
    }

    /// Open loans past their due date, across all members
    pub async fn overdue(&self, today: NaiveDate) -> Vec<LoanDetails> {
        let library = self.store.read().await;
        library
            .open_loans()
            .filter(|(_, l)| l.is_overdue(today))
            .map(|(m, l)| LoanDetails::new(l, &m.member_id, today))
            .collect()
    }

    pub async fn count_active(&self) -> usize {
        self.store.read().await.count_active()
    }

    pub async fn count_overdue(&self, today: NaiveDate) -> usize {
        self.store.read().await.count_overdue(today)
    }

    pub async fn total_owed(&self) -> Decimal {
        self.store.read().await.total_owed()
    }
}
