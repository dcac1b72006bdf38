use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::entity::{Entity, Filter, Patch};
use crate::domain::models::membership::{Membership, ProjectMemberEntry};
use crate::domain::models::project::Project;
use crate::domain::models::role::{Role, OWNER_ROLE_NAME};
use crate::domain::models::user::User;
use crate::domain::services::membership_guard::MembershipGuard;
use crate::error::AppError;
use crate::infra::store::Store;

pub struct NewMember {
    pub project_id: String,
    pub user_id: String,
    pub role_id: String,
    pub invited_by: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemberUpdate {
    pub role_id: Option<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Administrative membership management and project member listings.
pub struct MembershipService {
    store: Store,
    guard: MembershipGuard,
}

impl MembershipService {
    pub fn new(store: Store) -> Self {
        let guard = MembershipGuard::new(store.clone());
        Self { store, guard }
    }

    pub async fn add_member(&self, request: NewMember) -> Result<Membership, AppError> {
        self.require::<Project>(&request.project_id).await?;
        self.require::<User>(&request.user_id).await?;
        self.require::<Role>(&request.role_id).await?;
        if let Some(inviter) = &request.invited_by {
            self.require::<User>(inviter).await?;
        }

        self.guard.ensure_not_member(&request.project_id, &request.user_id).await?;

        let membership = Membership::new(request.project_id, request.user_id, request.role_id, request.invited_by);
        let created = self.store.create(&membership).await.map_err(MembershipGuard::translate)?;

        info!(
            project_id = %created.project_id,
            user_id = %created.user_id,
            "Member added directly, membership {}", created.project_member_id
        );
        Ok(created)
    }

    pub async fn get_member(&self, member_id: &str) -> Result<Membership, AppError> {
        self.require::<Membership>(member_id).await
    }

    pub async fn list_members(&self, filter: &Filter, skip: i64, limit: i64) -> Result<(Vec<Membership>, i64), AppError> {
        let items = self.store.list::<Membership>(filter, skip, limit).await?;
        let total = self.store.count::<Membership>(filter).await?;
        Ok((items, total))
    }

    pub async fn update_member(&self, member_id: &str, update: MemberUpdate) -> Result<Membership, AppError> {
        let mut patch = Patch::new();
        if let Some(role_id) = update.role_id {
            self.require::<Role>(&role_id).await?;
            patch = patch.set("role_id", role_id);
        }
        if let Some(last_activity) = update.last_activity {
            patch = patch.set("last_activity", last_activity);
        }
        self.store.update::<Membership>(member_id, &patch).await
    }

    /// Deactivates the membership; rows are never hard-deleted here.
    pub async fn remove_member(&self, member_id: &str) -> Result<Membership, AppError> {
        let removed = self
            .store
            .update::<Membership>(member_id, &Patch::new().set("is_active", false))
            .await?;
        info!(
            project_id = %removed.project_id,
            user_id = %removed.user_id,
            "Membership {} deactivated", removed.project_member_id
        );
        Ok(removed)
    }

    /// Active members of a project, with the owner first.
    ///
    /// The owner appears as an `OwnerImplicit` entry unless they also hold an
    /// explicit membership row.
    pub async fn project_members(&self, project_id: &str) -> Result<Vec<ProjectMemberEntry>, AppError> {
        let project = self.require::<Project>(project_id).await?;

        let active = Filter::new().eq("project_id", project_id).eq("is_active", true);
        let mut members = self.store.list_all::<Membership>(&active).await?;
        // Stable, so the rest keep their join order.
        members.sort_by_key(|m| m.user_id != project.owner_id);

        let mut entries = Vec::with_capacity(members.len() + 1);
        if !members.iter().any(|m| m.user_id == project.owner_id) {
            let owner_role = self
                .store
                .find_one::<Role>(&Filter::new().eq("role_name", OWNER_ROLE_NAME))
                .await?;
            entries.push(ProjectMemberEntry::OwnerImplicit {
                project_id: project.project_id.clone(),
                user_id: project.owner_id.clone(),
                role_id: owner_role.map(|r| r.role_id),
                joined_at: project.created_at,
            });
        }
        entries.extend(members.into_iter().map(ProjectMemberEntry::ExplicitMember));
        Ok(entries)
    }

    async fn require<E: Entity>(&self, key: &str) -> Result<E, AppError> {
        self.store.get::<E>(key).await?.ok_or_else(|| E::DESCRIPTOR.not_found())
    }
}
