use crate::domain::entity::Filter;
use crate::domain::models::membership::Membership;
use crate::error::AppError;
use crate::infra::store::Store;

pub const ALREADY_MEMBER: &str = "User is already a member of this project";

/// Enforces at most one active membership per (project, user).
///
/// The partial unique index `uq_active_membership` backs this up in storage;
/// [`MembershipGuard::translate`] folds its violations into the same conflict.
#[derive(Clone, Debug)]
pub struct MembershipGuard {
    store: Store,
}

impl MembershipGuard {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn is_member(&self, project_id: &str, user_id: &str) -> Result<bool, AppError> {
        let active = Filter::new()
            .eq("project_id", project_id)
            .eq("user_id", user_id)
            .eq("is_active", true);
        Ok(self.store.count::<Membership>(&active).await? > 0)
    }

    pub async fn ensure_not_member(&self, project_id: &str, user_id: &str) -> Result<(), AppError> {
        if self.is_member(project_id, user_id).await? {
            return Err(AppError::Conflict(ALREADY_MEMBER.to_string()));
        }
        Ok(())
    }

    pub fn translate(err: AppError) -> AppError {
        match err {
            AppError::UniqueViolation(_) => AppError::Conflict(ALREADY_MEMBER.to_string()),
            other => other,
        }
    }
}
