//! Statistics service

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::repository::Repository;

use super::loans::LoansService;

/// Library-wide counters
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub items: usize,
    pub copies: usize,
    pub available_copies: usize,
    pub members: usize,
    pub active_loans: usize,
    pub overdue_loans: usize,
    /// Sum of all members' outstanding balances
    pub fines_owed: Decimal,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
    loans: LoansService,
}

impl StatsService {
    pub fn new(repository: Repository, loans: LoansService) -> Self {
        Self { repository, loans }
    }

    pub async fn get_stats(&self) -> StatsResponse {
        let (items, copies, available_copies) = self.repository.items.count().await;
        StatsResponse {
            items,
            copies,
            available_copies,
            members: self.repository.members.count().await,
            active_loans: self.loans.count_active().await,
            overdue_loans: self.loans.count_overdue().await,
            fines_owed: self.repository.loans.total_owed().await,
        }
    }
}
