//! Business logic services

pub mod catalog;
pub mod loans;
pub mod members;
pub mod stats;

use std::sync::Arc;

use crate::{clock::Clock, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        let loans = loans::LoansService::new(repository.clone(), clock);
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            stats: stats::StatsService::new(repository, loans.clone()),
            loans,
        }
    }
}
