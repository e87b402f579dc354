//! Loan (borrow) model and related types

use std::fmt;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::item::{Item, MediaType};
use super::policy::{self, LoanPolicy};
use crate::error::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%d %b %Y";

/// `date` moved forward by `days`, rejected past the calendar range
fn days_after(date: NaiveDate, days: i64) -> AppResult<NaiveDate> {
    Duration::try_days(days)
        .and_then(|d| date.checked_add_signed(d))
        .ok_or_else(|| AppError::BadRequest(format!("Date {} is out of range", date)))
}

/// A copy lent to a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Loan {
    pub id: u64,
    pub copy_id: u32,
    pub title: String,
    pub media_type: MediaType,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub nb_renews: u16,
    /// Closed by a lost report rather than a return
    pub lost: bool,
    /// Amount added to the member's balance when the loan was closed
    pub charged: Decimal,
}

impl Loan {
    pub fn new(id: u64, copy_id: u32, item: &Item, loan_date: NaiveDate, policy: &LoanPolicy) -> AppResult<Self> {
        let media_type = item.media_type();
        Ok(Self {
            id,
            copy_id,
            title: item.title.clone(),
            media_type,
            loan_date,
            due_date: days_after(loan_date, policy.loan_duration(media_type))?,
            return_date: None,
            nb_renews: 0,
            lost: false,
            charged: Decimal::ZERO,
        })
    }

    pub fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }

    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
    }

    /// Push the due date back by one loan duration.
    ///
    /// Only allowed on or before the current due date, and while the renewal
    /// cap (if any) is not exhausted. A due date past the calendar range is an
    /// error and leaves the loan unchanged.
    pub fn renew(&mut self, renew_date: NaiveDate, policy: &LoanPolicy) -> AppResult<bool> {
        if self.is_returned() || renew_date > self.due_date {
            return Ok(false);
        }
        if let Some(max) = policy.max_renewals {
            if self.nb_renews >= max {
                return Ok(false);
            }
        }
        self.due_date = days_after(self.due_date, policy.loan_duration(self.media_type))?;
        self.nb_renews = self.nb_renews.saturating_add(1);
        Ok(true)
    }

    /// Days between the due date and `on`, zero when not late
    pub fn days_overdue(&self, on: NaiveDate) -> i64 {
        (on - self.due_date).num_days().max(0)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_returned() && today > self.due_date
    }

    /// Late fine for a returned loan, `None` while the copy is still out.
    pub fn fines(&self, policy: &LoanPolicy) -> AppResult<Option<Decimal>> {
        self.return_date
            .map(|returned| self.fine_on(returned, policy))
            .transpose()
    }

    /// Late fine if the copy comes back on `returned`; nothing for a lost copy
    pub fn fine_on(&self, returned: NaiveDate, policy: &LoanPolicy) -> AppResult<Decimal> {
        if self.lost {
            return Ok(Decimal::ZERO);
        }
        policy::amount(
            Decimal::from(self.days_overdue(returned))
                .checked_mul(policy.fine_per_day(self.media_type)),
        )
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let returned = match self.return_date {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => "On Loan".to_string(),
        };
        write!(
            f,
            "Loan Copy id: {} {}\n\t Due date: {} Return on: {}",
            self.copy_id,
            self.title,
            self.due_date.format(DATE_FORMAT),
            returned
        )
    }
}

/// Loan with computed state for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub member_id: String,
    pub is_overdue: bool,
    pub days_overdue: i64,
}

impl LoanDetails {
    pub fn new(loan: &Loan, member_id: &str, today: NaiveDate) -> Self {
        let days_overdue = if loan.is_returned() { 0 } else { loan.days_overdue(today) };
        Self {
            loan: loan.clone(),
            member_id: member_id.to_string(),
            is_overdue: loan.is_overdue(today),
            days_overdue,
        }
    }
}

/// Which loans of a member to list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanScope {
    #[default]
    Present,
    Past,
    All,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    /// present (default), past or all
    pub scope: Option<LoanScope>,
}
