//! Member registration service

use validator::Validate;

use crate::{
    error::AppResult,
    models::member::{CreateMember, Member, MemberSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn register(&self, request: CreateMember) -> AppResult<MemberSummary> {
        request.validate()?;
        let member = self.repository.members.create(Member::from(request)).await?;
        tracing::info!("Registered {:?} member {}", member.kind, member.member_id);
        Ok(member)
    }

    pub async fn list(&self) -> Vec<MemberSummary> {
        self.repository.members.list().await
    }

    pub async fn get(&self, member_id: &str) -> AppResult<Member> {
        tracing::debug!("Looking up member {}", member_id);
        self.repository.members.get(member_id).await
    }

    /// Remove a member; refused while they still have copies out
    pub async fn remove(&self, member_id: &str) -> AppResult<Member> {
        match self.repository.members.delete(member_id).await {
            Ok(member) => {
                tracing::info!("Removed member {}", member.member_id);
                Ok(member)
            }
            Err(e) => {
                tracing::warn!("Member {} not removed: {}", member_id, e);
                Err(e)
            }
        }
    }

    /// Text statement of a member's balance and loans
    pub async fn report(&self, member_id: &str) -> AppResult<String> {
        Ok(self.get(member_id).await?.to_string())
    }
}
