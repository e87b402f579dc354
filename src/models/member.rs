//! Member (borrower) model and the per-member lending rules

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::copy::{CopyStatus, ItemCopy};
use super::item::Item;
use super::loan::{Loan, DATE_FORMAT};
use super::policy::{self, LoanPolicy};
use crate::error::{AppError, AppResult};

/// Membership class, decides the loan quota
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Standard,
    Junior,
}

/// Library member with loan history and outstanding fines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub member_id: String,
    pub name: String,
    pub kind: MemberKind,
    pub amount_owed: Decimal,
    pub loans: Vec<Loan>,
}

impl Member {
    /// Member ids are case-insensitive and stored upper-case
    pub fn normalize_id(member_id: &str) -> String {
        member_id.trim().to_uppercase()
    }

    pub fn new(member_id: &str, name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            member_id: Self::normalize_id(member_id),
            name: name.into(),
            kind,
            amount_owed: Decimal::ZERO,
            loans: Vec::new(),
        }
    }

    pub fn standard(member_id: &str, name: impl Into<String>) -> Self {
        Self::new(member_id, name, MemberKind::Standard)
    }

    pub fn junior(member_id: &str, name: impl Into<String>) -> Self {
        Self::new(member_id, name, MemberKind::Junior)
    }

    /// Returned loans, optionally only those for `title`
    pub fn past_loans(&self, title: Option<&str>) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| l.is_returned() && title.map_or(true, |t| l.title_matches(t)))
            .collect()
    }

    /// Unreturned loans, optionally only those for `title`
    pub fn present_loans(&self, title: Option<&str>) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|l| !l.is_returned() && title.map_or(true, |t| l.title_matches(t)))
            .collect()
    }

    fn search_loan_index(&self, title: &str) -> Option<usize> {
        let present = self
            .loans
            .iter()
            .position(|l| !l.is_returned() && l.title_matches(title));
        if present.is_some() {
            return present;
        }

        // latest return wins, earliest entry on ties
        self.loans
            .iter()
            .enumerate()
            .filter(|(_, l)| l.is_returned() && l.title_matches(title))
            .reduce(|best, cur| if cur.1.return_date > best.1.return_date { cur } else { best })
            .map(|(idx, _)| idx)
    }

    /// First unreturned loan for `title`, else the most recently returned one
    pub fn search_loan_for(&self, title: &str) -> Option<&Loan> {
        self.search_loan_index(title).map(|idx| &self.loans[idx])
    }

    pub fn current_loan_count(&self) -> usize {
        self.loans.iter().filter(|l| !l.is_returned()).count()
    }

    pub fn loan_quota(&self, policy: &LoanPolicy) -> usize {
        policy.quota(self.kind)
    }

    pub fn quota_reached(&self, policy: &LoanPolicy) -> bool {
        self.current_loan_count() >= self.loan_quota(policy)
    }

    /// Lend `copy` to this member.
    ///
    /// Checks run in order: copy availability, loan quota, outstanding fines.
    pub fn borrow_item(
        &mut self,
        copy: &mut ItemCopy,
        item: &Item,
        loan_id: u64,
        date: NaiveDate,
        policy: &LoanPolicy,
    ) -> AppResult<&Loan> {
        if !copy.available() {
            return Err(AppError::Unavailable(copy.with_item(item).to_string()));
        }
        if self.quota_reached(policy) {
            return Err(AppError::QuotaReached {
                current: self.current_loan_count(),
                quota: self.loan_quota(policy),
            });
        }
        if self.amount_owed > Decimal::ZERO {
            return Err(AppError::Payment {
                amount: self.amount_owed,
                message: format!("You have ${:.2} outstanding fines", self.amount_owed),
            });
        }

        let loan = Loan::new(loan_id, copy.copy_id, item, date, policy)?;
        self.loans.push(loan);
        copy.status = CopyStatus::OnLoan;
        Ok(&self.loans[self.loans.len() - 1])
    }

    /// Index of the present loan for `title`, or the error explaining why
    /// there is none.
    fn present_loan_index(&self, title: &str) -> AppResult<usize> {
        let idx = self
            .search_loan_index(title)
            .ok_or_else(|| AppError::NoLoanRecorded(title.to_string()))?;
        let loan = &self.loans[idx];
        match loan.return_date {
            Some(returned_on) => Err(AppError::LoanReturned {
                title: loan.title.clone(),
                returned_on,
            }),
            None => Ok(idx),
        }
    }

    pub fn renew(&mut self, title: &str, renew_date: NaiveDate, policy: &LoanPolicy) -> AppResult<&Loan> {
        let idx = self.present_loan_index(title)?;
        let loan = &mut self.loans[idx];

        if loan.due_date < renew_date {
            return Err(AppError::RenewalTooLate {
                renew_date,
                due_date: loan.due_date,
            });
        }
        if !loan.renew(renew_date, policy)? {
            return Err(AppError::BusinessRule(format!(
                "Maximum renewals reached ({}/{})",
                loan.nb_renews,
                policy.max_renewals.unwrap_or(loan.nb_renews)
            )));
        }
        Ok(&self.loans[idx])
    }

    /// Close the present loan for `title` and charge any late fine.
    ///
    /// The caller releases the copy named by the returned loan. Nothing changes
    /// when the fine or the new balance is out of range.
    pub fn return_item(&mut self, title: &str, return_date: NaiveDate, policy: &LoanPolicy) -> AppResult<&Loan> {
        let idx = self.present_loan_index(title)?;
        let loan = &mut self.loans[idx];

        if return_date < loan.loan_date {
            return Err(AppError::BadRequest(format!(
                "Return date {} is before the loan date {}",
                return_date.format(DATE_FORMAT),
                loan.loan_date.format(DATE_FORMAT)
            )));
        }

        let fine = loan.fine_on(return_date, policy)?;
        let owed = policy::amount(self.amount_owed.checked_add(fine))?;

        loan.return_date = Some(return_date);
        loan.charged = fine;
        self.amount_owed = owed;
        Ok(&self.loans[idx])
    }

    /// Close the present loan for `title` as lost and charge `lost_charges`.
    ///
    /// A report dated before the loan closes it on the loan date.
    pub fn report_lost(&mut self, title: &str, date: NaiveDate, lost_charges: Decimal) -> AppResult<&Loan> {
        let idx = self.present_loan_index(title)?;
        let owed = policy::amount(self.amount_owed.checked_add(lost_charges))?;
        let loan = &mut self.loans[idx];

        loan.return_date = Some(date.max(loan.loan_date));
        loan.lost = true;
        loan.charged = lost_charges;
        self.amount_owed = owed;
        Ok(&self.loans[idx])
    }

    /// Pay towards the outstanding balance, returning the change
    pub fn pay(&mut self, amount: Decimal) -> AppResult<Decimal> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Payment {
                amount,
                message: format!(
                    "You owed ${:.2}. Please pay an amount that is more than $0",
                    self.amount_owed
                ),
            });
        }
        let change = if amount > self.amount_owed {
            amount - self.amount_owed
        } else {
            Decimal::ZERO
        };
        self.amount_owed -= amount - change;
        Ok(change)
    }
}

fn write_loans(f: &mut fmt::Formatter<'_>, loans: &[&Loan], empty: &str) -> fmt::Result {
    if loans.is_empty() {
        return writeln!(f, "{}", empty);
    }
    for loan in loans {
        writeln!(f, "{}", loan)?;
    }
    Ok(())
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Id: {} {} Owed: ${:.2}", self.member_id, self.name, self.amount_owed)?;
        writeln!(f, "Past loans:")?;
        write_loans(f, &self.past_loans(None), "No past loans")?;
        writeln!(f, "Present loans:")?;
        write_loans(f, &self.present_loans(None), "No outstanding loans")?;
        write!(f, "Outstanding loans: {}", self.current_loan_count())
    }
}

/// Member overview returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberSummary {
    pub member_id: String,
    pub name: String,
    pub kind: MemberKind,
    pub amount_owed: Decimal,
    pub nb_loans: usize,
    pub quota: usize,
    pub quota_reached: bool,
}

impl MemberSummary {
    pub fn new(member: &Member, policy: &LoanPolicy) -> Self {
        Self {
            member_id: member.member_id.clone(),
            name: member.name.clone(),
            kind: member.kind,
            amount_owed: member.amount_owed,
            nb_loans: member.current_loan_count(),
            quota: member.loan_quota(policy),
            quota_reached: member.quota_reached(policy),
        }
    }
}

/// Register member request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMember {
    #[validate(length(min = 1, max = 32, message = "Member id must be 1-32 characters"))]
    pub member_id: String,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
}

impl From<CreateMember> for Member {
    fn from(req: CreateMember) -> Self {
        Member::new(&req.member_id, req.name, req.kind)
    }
}
