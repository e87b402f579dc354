//! Members repository

use crate::{
    error::{AppError, AppResult},
    models::member::{Member, MemberSummary},
};

use super::Store;

#[derive(Clone)]
pub struct MembersRepository {
    store: Store,
}

impl MembersRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, member: Member) -> AppResult<MemberSummary> {
        let mut library = self.store.write().await;
        let member_id = member.member_id.clone();
        if !library.register_member(member) {
            return Err(AppError::Conflict(format!("Member '{}' already exists", member_id)));
        }
        let member = library.member(&member_id)?;
        Ok(MemberSummary::new(member, library.policy()))
    }

    pub async fn list(&self) -> Vec<MemberSummary> {
        let library = self.store.read().await;
        library
            .members()
            .map(|m| MemberSummary::new(m, library.policy()))
            .collect()
    }

    pub async fn get(&self, member_id: &str) -> AppResult<Member> {
        let library = self.store.read().await;
        library.member(member_id).cloned()
    }

    /// Remove a member that has no copies out
    pub async fn delete(&self, member_id: &str) -> AppResult<Member> {
        let mut library = self.store.write().await;
        let member = library.member(member_id)?;
        let count = member.current_loan_count();
        if count > 0 {
            return Err(AppError::MemberHasLoans {
                member_id: member.member_id.clone(),
                count,
            });
        }
        library
            .remove_member(member_id)
            .ok_or_else(|| AppError::MemberNotFound(Member::normalize_id(member_id)))
    }

    pub async fn count(&self) -> usize {
        self.store.read().await.members().count()
    }
}
