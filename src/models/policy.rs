//! Lending policy: loan durations, fines, quotas and admin charges

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::item::{Item, ItemKind, MediaType};
use super::member::MemberKind;
use crate::error::{AppError, AppResult};

/// Longest configurable loan duration
pub const MAX_DURATION_DAYS: i64 = 3650;

/// Upper bound for fines per day and admin rates
pub const MAX_RATE: Decimal = Decimal::ONE_THOUSAND;

/// Checked money arithmetic result
pub fn amount(value: Option<Decimal>) -> AppResult<Decimal> {
    value.ok_or_else(|| AppError::BadRequest("Amount out of range".to_string()))
}

/// Lending rules applied to every loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoanPolicy {
    pub book_duration_days: i64,
    pub media_duration_days: i64,
    pub book_fine_per_day: Decimal,
    pub media_fine_per_day: Decimal,
    pub standard_quota: usize,
    pub junior_quota: usize,
    /// Media admin charge is `media_admin_rate * cost`
    pub media_admin_rate: Decimal,
    /// Book admin rate once the book reaches `book_admin_age_years`
    pub book_admin_floor_rate: Decimal,
    pub book_admin_age_years: i32,
    /// Renewals allowed per loan, unlimited when unset
    pub max_renewals: Option<u16>,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            book_duration_days: 14,
            media_duration_days: 3,
            book_fine_per_day: Decimal::new(25, 2),
            media_fine_per_day: Decimal::new(250, 2),
            standard_quota: 4,
            junior_quota: 2,
            media_admin_rate: Decimal::new(15, 1),
            book_admin_floor_rate: Decimal::new(10, 2),
            book_admin_age_years: 10,
            max_renewals: None,
        }
    }
}

impl LoanPolicy {
    pub fn loan_duration(&self, media_type: MediaType) -> i64 {
        match media_type {
            MediaType::Book => self.book_duration_days,
            MediaType::Media => self.media_duration_days,
        }
    }

    pub fn fine_per_day(&self, media_type: MediaType) -> Decimal {
        match media_type {
            MediaType::Book => self.book_fine_per_day,
            MediaType::Media => self.media_fine_per_day,
        }
    }

    pub fn quota(&self, kind: MemberKind) -> usize {
        match kind {
            MemberKind::Standard => self.standard_quota,
            MemberKind::Junior => self.junior_quota,
        }
    }

    /// Administrative charge for replacing `item`, as of `current_year`.
    ///
    /// Books depreciate: the rate is `(age_years - age) / age_years` until the
    /// book is `age_years - 1` years old, after which the floor rate applies.
    /// A publication year in the future counts as age 0.
    pub fn admin_charge(&self, item: &Item, current_year: i32) -> AppResult<Decimal> {
        let rate = match item.kind {
            ItemKind::Media => self.media_admin_rate,
            ItemKind::Book { .. } => {
                let age = current_year.saturating_sub(item.year_published).max(0);
                if age > self.book_admin_age_years.saturating_sub(1) {
                    self.book_admin_floor_rate
                } else {
                    amount(
                        Decimal::from(self.book_admin_age_years - age)
                            .checked_div(Decimal::from(self.book_admin_age_years)),
                    )?
                }
            }
        };
        amount(rate.checked_mul(item.cost))
    }

    pub fn validate(&self) -> AppResult<()> {
        let durations = [self.book_duration_days, self.media_duration_days];
        if durations.iter().any(|d| !(1..=MAX_DURATION_DAYS).contains(d)) {
            return Err(AppError::Validation(format!(
                "Loan durations must be between 1 and {} days",
                MAX_DURATION_DAYS
            )));
        }
        if self.standard_quota == 0 || self.junior_quota == 0 {
            return Err(AppError::Validation("Loan quotas must be positive".to_string()));
        }
        if self.book_admin_age_years <= 0 {
            return Err(AppError::Validation(
                "book_admin_age_years must be positive".to_string(),
            ));
        }
        let rates = [
            self.book_fine_per_day,
            self.media_fine_per_day,
            self.media_admin_rate,
            self.book_admin_floor_rate,
        ];
        if rates.iter().any(|r| r.is_sign_negative() || *r > MAX_RATE) {
            return Err(AppError::Validation(format!(
                "Fines and rates must be between 0 and {}",
                MAX_RATE
            )));
        }
        Ok(())
    }
}
