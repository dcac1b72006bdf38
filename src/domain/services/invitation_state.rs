//! Invitation lifecycle rules.
//!
//! `pending` is the only state that admits a transition; `accepted`,
//! `declined` and `expired` are terminal.

use chrono::{DateTime, Utc};

use crate::domain::models::invitation::{Invitation, InvitationAction, InvitationStatus};
use crate::error::AppError;

/// Status an action leads to when applied to a pending invitation.
pub fn target(action: InvitationAction) -> Option<InvitationStatus> {
    match action {
        InvitationAction::Accept => Some(InvitationStatus::Accepted),
        InvitationAction::Decline => Some(InvitationStatus::Declined),
        InvitationAction::Expire => Some(InvitationStatus::Expired),
        InvitationAction::Open => None,
    }
}

/// Validates `action` against `current` and yields the resulting status.
///
/// `Open` leaves the status untouched but, like every other action, is
/// refused on an expired invitation.
pub fn transition(current: InvitationStatus, action: InvitationAction) -> Result<InvitationStatus, AppError> {
    match (current, target(action)) {
        (InvitationStatus::Expired, _) => Err(AppError::InvalidState { current, action }),
        (_, None) => Ok(current),
        (_, Some(_)) if current.is_terminal() => Err(AppError::InvalidState { current, action }),
        (_, Some(next)) => Ok(next),
    }
}

pub fn is_due_for_expiry(invitation: &Invitation, now: DateTime<Utc>) -> bool {
    invitation.status == InvitationStatus::Pending && now >= invitation.expires_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::invitation::NewInvitationParams;
    use chrono::Duration;

    const ALL: [InvitationStatus; 4] = [
        InvitationStatus::Pending,
        InvitationStatus::Accepted,
        InvitationStatus::Declined,
        InvitationStatus::Expired,
    ];

    fn invitation(expires_in: Duration) -> Invitation {
        let now = Utc::now();
        Invitation::new(NewInvitationParams {
            project_id: "p1".into(),
            email: "a@x.com".into(),
            user_id: None,
            role_id: "r1".into(),
            invited_by: "u1".into(),
            token: "t".repeat(32),
            created_at: now,
            expires_at: now + expires_in,
        })
    }

    #[test]
    fn pending_moves_to_each_terminal_state() {
        assert_eq!(transition(InvitationStatus::Pending, InvitationAction::Accept).unwrap(), InvitationStatus::Accepted);
        assert_eq!(transition(InvitationStatus::Pending, InvitationAction::Decline).unwrap(), InvitationStatus::Declined);
        assert_eq!(transition(InvitationStatus::Pending, InvitationAction::Expire).unwrap(), InvitationStatus::Expired);
    }

    #[test]
    fn terminal_states_refuse_every_transition() {
        for current in ALL.into_iter().filter(|s| s.is_terminal()) {
            for action in [InvitationAction::Accept, InvitationAction::Decline, InvitationAction::Expire] {
                match transition(current, action) {
                    Err(AppError::InvalidState { current: c, action: a }) => {
                        assert_eq!(c, current);
                        assert_eq!(a, action);
                    }
                    other => panic!("{current} -> {action} should be refused, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn opening_is_refused_only_when_expired() {
        assert!(transition(InvitationStatus::Pending, InvitationAction::Open).is_ok());
        assert!(transition(InvitationStatus::Accepted, InvitationAction::Open).is_ok());
        assert!(transition(InvitationStatus::Declined, InvitationAction::Open).is_ok());
        assert!(transition(InvitationStatus::Expired, InvitationAction::Open).is_err());
    }

    #[test]
    fn expiry_is_due_at_and_after_deadline() {
        let inv = invitation(Duration::hours(1));
        assert!(!is_due_for_expiry(&inv, Utc::now()));
        assert!(is_due_for_expiry(&inv, inv.expires_at));
        assert!(is_due_for_expiry(&inv, inv.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn only_pending_invitations_expire() {
        let mut inv = invitation(-Duration::hours(1));
        inv.status = InvitationStatus::Declined;
        assert!(!is_due_for_expiry(&inv, Utc::now()));
    }
}
