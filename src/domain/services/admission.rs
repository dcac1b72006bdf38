//! Invitation issuance and admission into projects.
//!
//! The coordinator owns the invitation lifecycle: it validates referenced
//! records, issues tokens, applies lazy expiry on every read or action, and
//! turns an accepted invitation into a membership atomically.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

use crate::domain::entity::Filter;
use crate::domain::models::invitation::{
    Invitation, InvitationAction, InvitationDetails, InvitationStatus, NewInvitationParams,
};
use crate::domain::models::membership::Membership;
use crate::domain::models::notification::{NewNotification, Notification};
use crate::domain::models::project::Project;
use crate::domain::models::role::Role;
use crate::domain::models::user::User;
use crate::domain::services::invitation_state;
use crate::domain::services::membership_guard::{MembershipGuard, ALREADY_MEMBER};
use crate::domain::services::token_issuer::TokenSource;
use crate::error::AppError;
use crate::infra::store::Store;

pub const MAX_TOKEN_ATTEMPTS: usize = 5;
pub const PENDING_EXISTS: &str = "Pending invitation already exists for this email and project";

pub struct NewInvitation {
    pub project_id: String,
    pub email: String,
    pub role_id: String,
    pub invited_by: String,
    pub user_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Clone)]
pub struct InvitationQuery {
    pub project_id: Option<String>,
    pub email: Option<String>,
    pub status: Option<InvitationStatus>,
}

/// Trims and lower-cases an address, rejecting obviously malformed input.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(email),
        _ => Err(AppError::Validation(format!("Invalid email address '{}'", raw.trim()))),
    }
}

pub struct AdmissionCoordinator {
    store: Store,
    guard: MembershipGuard,
    tokens: Arc<dyn TokenSource>,
    invitation_ttl: Duration,
}

impl AdmissionCoordinator {
    pub fn new(store: Store, tokens: Arc<dyn TokenSource>, invitation_ttl: Duration) -> Self {
        let guard = MembershipGuard::new(store.clone());
        Self { store, guard, tokens, invitation_ttl }
    }

    pub async fn create_invitation(&self, request: NewInvitation) -> Result<Invitation, AppError> {
        let email = normalize_email(&request.email)?;

        let project = self
            .store
            .get::<Project>(&request.project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        self.store
            .get::<Role>(&request.role_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Role not found".into()))?;
        self.store
            .get::<User>(&request.invited_by)
            .await?
            .ok_or_else(|| AppError::NotFound("Inviter not found".into()))?;

        if let Some(user_id) = &request.user_id {
            self.store
                .get::<User>(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            if let Err(e) = self.guard.ensure_not_member(&project.project_id, user_id).await {
                warn!("Refused invitation for {} to project {}: already a member", user_id, project.project_id);
                return Err(e);
            }
        }

        self.ensure_no_pending(&project.project_id, &email).await?;

        let now = Utc::now();
        let expires_at = request.expires_at.unwrap_or(now + self.invitation_ttl);

        for attempt in 1..=MAX_TOKEN_ATTEMPTS {
            let invitation = Invitation::new(NewInvitationParams {
                project_id: project.project_id.clone(),
                email: email.clone(),
                user_id: request.user_id.clone(),
                role_id: request.role_id.clone(),
                invited_by: request.invited_by.clone(),
                token: self.tokens.issue(),
                created_at: now,
                expires_at,
            });

            match self.store.create(&invitation).await {
                Ok(created) => {
                    info!(
                        invitation_id = %created.invitation_id,
                        project_id = %created.project_id,
                        "Invitation created for {}", created.email
                    );
                    self.notify_invitee(&created, &project).await;
                    return Ok(created);
                }
                Err(AppError::UniqueViolation(target)) if target.contains("token") => {
                    warn!(attempt, "Invitation token collision, issuing a new token");
                }
                Err(AppError::UniqueViolation(_)) => {
                    warn!("Concurrent invitation for {} to project {} lost the race", email, project.project_id);
                    return Err(AppError::Conflict(PENDING_EXISTS.into()));
                }
                Err(e) => return Err(e),
            }
        }

        error!("Gave up issuing an invitation token after {} attempts", MAX_TOKEN_ATTEMPTS);
        Err(AppError::TokenIssuance(MAX_TOKEN_ATTEMPTS))
    }

    pub async fn get_invitation(&self, invitation_id: &str) -> Result<Invitation, AppError> {
        let invitation = self.load(invitation_id).await?;
        self.expire_if_due(invitation).await
    }

    pub async fn get_invitation_by_token(&self, token: &str) -> Result<Invitation, AppError> {
        let invitation = self
            .store
            .find_one::<Invitation>(&Filter::new().eq("token", token))
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".into()))?;

        let invitation = self.expire_if_due(invitation).await?;
        invitation_state::transition(invitation.status, InvitationAction::Open)?;
        Ok(invitation)
    }

    pub async fn list_invitations(
        &self,
        query: &InvitationQuery,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Invitation>, i64), AppError> {
        let email = query.email.as_deref().map(normalize_email).transpose()?;

        // Expire overdue rows in scope first so the page and the total agree.
        let in_scope = Filter::new()
            .eq_opt("project_id", query.project_id.clone())
            .eq_opt("email", email.clone())
            .eq("status", InvitationStatus::Pending);
        self.expire_overdue(&in_scope).await?;

        let filter = Filter::new()
            .eq_opt("project_id", query.project_id.clone())
            .eq_opt("email", email)
            .eq_opt("status", query.status);

        let items = self.store.list::<Invitation>(&filter, skip, limit).await?;
        let total = self.store.count::<Invitation>(&filter).await?;
        Ok((items, total))
    }

    /// Invitations addressed to `email`, each with its project, role and inviter.
    /// Overdue rows are expired first; `pending_only` then keeps the live ones.
    pub async fn invitations_for_email(
        &self,
        email: &str,
        pending_only: bool,
    ) -> Result<Vec<InvitationDetails>, AppError> {
        let email = normalize_email(email)?;
        let filter = Filter::new().eq("email", email);

        let mut details = Vec::new();
        for invitation in self.store.list_all::<Invitation>(&filter).await? {
            let invitation = self.expire_if_due(invitation).await?;
            if pending_only && invitation.status != InvitationStatus::Pending {
                continue;
            }
            if let Some(detail) = self.with_details(invitation).await? {
                details.push(detail);
            }
        }
        Ok(details)
    }

    pub async fn accept_invitation(&self, invitation_id: &str, accepting_user_id: &str) -> Result<Membership, AppError> {
        let invitation = self.load(invitation_id).await?;
        let user = self
            .store
            .get::<User>(accepting_user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        let invitation = self.expire_if_due(invitation).await?;
        if let Err(e) = invitation_state::transition(invitation.status, InvitationAction::Accept) {
            warn!(invitation_id, "Refused accept: {}", e);
            return Err(e);
        }

        if user.email.trim().to_lowercase() != invitation.email {
            warn!(invitation_id, user_id = %user.user_id, "Refused accept: email mismatch");
            return Err(AppError::Validation("User email does not match invitation email".into()));
        }

        if self.guard.is_member(&invitation.project_id, &user.user_id).await? {
            // A concurrent accept of this same invitation reports the state it left behind.
            let err = match self.load(invitation_id).await?.status {
                InvitationStatus::Pending => AppError::Conflict(ALREADY_MEMBER.into()),
                current => AppError::InvalidState { current, action: InvitationAction::Accept },
            };
            warn!(invitation_id, user_id = %user.user_id, "Refused accept: {}", err);
            return Err(err);
        }

        let membership = Membership::new(
            invitation.project_id.clone(),
            user.user_id.clone(),
            invitation.role_id.clone(),
            Some(invitation.invited_by.clone()),
        );

        let created = self
            .store
            .accept_invitation(invitation_id, &user.user_id, Utc::now(), &membership)
            .await
            .map_err(MembershipGuard::translate)?;

        let Some(created) = created else {
            let err = self.lost_race(invitation_id, InvitationAction::Accept).await;
            warn!(invitation_id, "Refused accept after concurrent change: {}", err);
            return Err(err);
        };

        info!(
            invitation_id,
            project_id = %created.project_id,
            user_id = %created.user_id,
            "Invitation accepted, membership {} created", created.project_member_id
        );
        self.notify_inviter(&invitation, &user).await;
        Ok(created)
    }

    pub async fn decline_invitation(&self, invitation_id: &str) -> Result<Invitation, AppError> {
        let invitation = self.load(invitation_id).await?;
        let invitation = self.expire_if_due(invitation).await?;
        if let Err(e) = invitation_state::transition(invitation.status, InvitationAction::Decline) {
            warn!(invitation_id, "Refused decline: {}", e);
            return Err(e);
        }

        match self.store.advance_invitation(invitation_id, InvitationStatus::Declined).await? {
            Some(declined) => {
                info!(invitation_id, "Invitation declined");
                Ok(declined)
            }
            None => Err(self.lost_race(invitation_id, InvitationAction::Decline).await),
        }
    }

    pub async fn delete_invitation(&self, invitation_id: &str) -> Result<Invitation, AppError> {
        let removed = self
            .store
            .delete::<Invitation>(invitation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".into()))?;
        info!(invitation_id, "Invitation deleted");
        Ok(removed)
    }

    async fn load(&self, invitation_id: &str) -> Result<Invitation, AppError> {
        self.store
            .get::<Invitation>(invitation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".into()))
    }

    /// Persists `expired` for a pending invitation past its deadline and
    /// returns the current record.
    async fn expire_if_due(&self, invitation: Invitation) -> Result<Invitation, AppError> {
        if !invitation_state::is_due_for_expiry(&invitation, Utc::now()) {
            return Ok(invitation);
        }

        invitation_state::transition(invitation.status, InvitationAction::Expire)?;
        match self.store.advance_invitation(&invitation.invitation_id, InvitationStatus::Expired).await? {
            Some(expired) => {
                info!(invitation_id = %expired.invitation_id, "Invitation expired");
                Ok(expired)
            }
            // Someone else moved it first; report what is stored now.
            None => self.load(&invitation.invitation_id).await,
        }
    }

    async fn with_details(&self, invitation: Invitation) -> Result<Option<InvitationDetails>, AppError> {
        let project = self.store.get::<Project>(&invitation.project_id).await?;
        let role = self.store.get::<Role>(&invitation.role_id).await?;
        let inviter = self.store.get::<User>(&invitation.invited_by).await?;
        match (project, role, inviter) {
            (Some(project), Some(role), Some(inviter)) => Ok(Some(InvitationDetails { invitation, project, role, inviter })),
            _ => {
                warn!(invitation_id = %invitation.invitation_id, "Invitation references a missing record; skipped");
                Ok(None)
            }
        }
    }

    async fn expire_overdue(&self, pending: &Filter) -> Result<(), AppError> {
        let now = Utc::now();
        for invitation in self.store.list_all::<Invitation>(pending).await? {
            if invitation_state::is_due_for_expiry(&invitation, now) {
                self.expire_if_due(invitation).await?;
            }
        }
        Ok(())
    }

    async fn ensure_no_pending(&self, project_id: &str, email: &str) -> Result<(), AppError> {
        let filter = Filter::new()
            .eq("project_id", project_id)
            .eq("email", email)
            .eq("status", InvitationStatus::Pending);

        for invitation in self.store.list_all::<Invitation>(&filter).await? {
            if self.expire_if_due(invitation).await?.status == InvitationStatus::Pending {
                warn!("Refused invitation for {} to project {}: one is already pending", email, project_id);
                return Err(AppError::Conflict(PENDING_EXISTS.into()));
            }
        }
        Ok(())
    }

    /// Error for a conditional update that matched nothing, using the status
    /// re-read from storage.
    async fn lost_race(&self, invitation_id: &str, action: InvitationAction) -> AppError {
        match self.load(invitation_id).await {
            Ok(current) => AppError::InvalidState { current: current.status, action },
            Err(e) => e,
        }
    }

    async fn notify_invitee(&self, invitation: &Invitation, project: &Project) {
        let Some(user_id) = invitation.user_id.clone() else {
            return;
        };
        self.notify(NewNotification {
            user_id,
            project_id: Some(project.project_id.clone()),
            notification_type: "invitation".into(),
            title: "Project invitation".into(),
            message: Some(format!("You have been invited to join {}", project.project_name)),
        })
        .await;
    }

    async fn notify_inviter(&self, invitation: &Invitation, member: &User) {
        self.notify(NewNotification {
            user_id: invitation.invited_by.clone(),
            project_id: Some(invitation.project_id.clone()),
            notification_type: "member_added".into(),
            title: "Invitation accepted".into(),
            message: Some(format!("{} joined the project", member.username)),
        })
        .await;
    }

    async fn notify(&self, draft: NewNotification) {
        let notification = Notification::new(draft);
        if let Err(e) = self.store.create(&notification).await {
            warn!("Failed to record {} notification: {}", notification.notification_type, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Alice@Example.COM ").unwrap(), "alice@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in ["", "   ", "alice", "@example.com", "alice@", "a@b@c"] {
            assert!(matches!(normalize_email(raw), Err(AppError::Validation(_))), "{raw:?} accepted");
        }
    }
}
