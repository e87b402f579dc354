//! Loan management service

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    clock::Clock,
    error::AppResult,
    models::loan::{Loan, LoanDetails, LoanScope},
    repository::Repository,
};

/// Outcome of a borrow
#[derive(Debug, Clone)]
pub struct BorrowOutcome {
    pub loan: Loan,
    /// Fines paid off as part of the borrow
    pub settled: Decimal,
}

/// Outcome of closing a loan (return or lost report)
#[derive(Debug, Clone)]
pub struct ClosedLoan {
    pub loan: Loan,
    pub amount_owed: Decimal,
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl LoansService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn date_or_today(&self, date: Option<NaiveDate>) -> NaiveDate {
        date.unwrap_or_else(|| self.clock.today())
    }

    /// Get loans for a member
    pub async fn member_loans(&self, member_id: &str, scope: LoanScope) -> AppResult<Vec<LoanDetails>> {
        self.repository
            .loans
            .member_loans(member_id, scope, self.today())
            .await
    }

    /// Lend a copy to a member.
    ///
    /// With `settle_fines`, any outstanding balance is paid in full before the
    /// loan is created; otherwise an outstanding balance rejects the borrow.
    pub async fn borrow(
        &self,
        member_id: &str,
        copy_id: u32,
        date: Option<NaiveDate>,
        settle_fines: bool,
    ) -> AppResult<BorrowOutcome> {
        let date = self.date_or_today(date);
        match self
            .repository
            .loans
            .create(member_id, copy_id, date, settle_fines)
            .await
        {
            Ok((loan, settled)) => {
                if settled > Decimal::ZERO {
                    tracing::info!("Member {} settled ${:.2} before borrowing", member_id, settled);
                }
                tracing::info!(
                    "Member {} borrowed copy {} '{}', due {}",
                    member_id,
                    loan.copy_id,
                    loan.title,
                    loan.due_date
                );
                Ok(BorrowOutcome { loan, settled })
            }
            Err(e) => {
                tracing::warn!("Borrow of copy {} by {} refused: {}", copy_id, member_id, e);
                Err(e)
            }
        }
    }

    /// Renew a member's loan by title
    pub async fn renew(&self, member_id: &str, title: &str, date: Option<NaiveDate>) -> AppResult<Loan> {
        let date = self.date_or_today(date);
        let loan = self
            .repository
            .loans
            .renew(member_id, title, date)
            .await
            .inspect_err(|e| tracing::warn!("Renewal of '{}' by {} refused: {}", title, member_id, e))?;
        tracing::info!("Member {} renewed '{}', now due {}", member_id, loan.title, loan.due_date);
        Ok(loan)
    }

    /// Return a borrowed item by title
    pub async fn return_item(&self, member_id: &str, title: &str, date: Option<NaiveDate>) -> AppResult<ClosedLoan> {
        let date = self.date_or_today(date);
        let (loan, amount_owed) = self
            .repository
            .loans
            .return_item(member_id, title, date)
            .await
            .inspect_err(|e| tracing::warn!("Return of '{}' by {} refused: {}", title, member_id, e))?;
        tracing::info!(
            "Member {} returned copy {} '{}', fine ${:.2}",
            member_id,
            loan.copy_id,
            loan.title,
            loan.charged
        );
        Ok(ClosedLoan { loan, amount_owed })
    }

    /// Report a borrowed copy as lost; the member is charged its lost charges
    pub async fn report_lost(&self, member_id: &str, title: &str, date: Option<NaiveDate>) -> AppResult<ClosedLoan> {
        let date = self.date_or_today(date);
        let (loan, amount_owed) = self
            .repository
            .loans
            .report_lost(member_id, title, date)
            .await
            .inspect_err(|e| tracing::warn!("Lost report of '{}' by {} refused: {}", title, member_id, e))?;
        tracing::info!(
            "Member {} lost copy {} '{}', charged ${:.2}",
            member_id,
            loan.copy_id,
            loan.title,
            loan.charged
        );
        Ok(ClosedLoan { loan, amount_owed })
    }

    /// Pay towards outstanding fines. Returns `(change, remaining balance)`.
    pub async fn pay(&self, member_id: &str, amount: Decimal) -> AppResult<(Decimal, Decimal)> {
        let (change, owed) = self
            .repository
            .loans
            .pay(member_id, amount)
            .await
            .inspect_err(|e| tracing::warn!("Payment of ${:.2} by {} refused: {}", amount, member_id, e))?;
        tracing::info!(
            "Member {} paid ${:.2}, balance ${:.2}, change ${:.2}",
            member_id,
            amount,
            owed,
            change
        );
        Ok((change, owed))
    }

    /// Open loans past their due date
    pub async fn overdue(&self) -> Vec<LoanDetails> {
        self.repository.loans.overdue(self.today()).await
    }

    /// Count active loans
    pub async fn count_active(&self) -> usize {
        self.repository.loans.count_active().await
    }

    /// Count overdue loans
    pub async fn count_overdue(&self) -> usize {
        self.repository.loans.count_overdue(self.today()).await
    }
}
