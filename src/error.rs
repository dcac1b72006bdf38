use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use crate::domain::models::invitation::{InvitationAction, InvitationStatus};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Duplicate value violates {0}")]
    UniqueViolation(String),
    #[error("{}", describe_invalid_state(*current, *action))]
    InvalidState {
        current: InvitationStatus,
        action: InvitationAction,
    },
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Could not issue a unique invitation token after {0} attempts")]
    TokenIssuance(usize),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

fn describe_invalid_state(current: InvitationStatus, action: InvitationAction) -> String {
    match current {
        InvitationStatus::Expired => "Invitation has expired".to_string(),
        _ => format!("Invitation status is '{}', cannot {}", current, action.verb()),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error()
                    && db_err.is_unique_violation()
                {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)" })),
                    )
                        .into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Migration(e) => {
                error!("Migration error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Config(e) => {
                error!("Configuration error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::UniqueViolation(_) => (
                StatusCode::CONFLICT,
                "Resource already exists (duplicate entry)".to_string(),
            ),
            AppError::InvalidState { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::TokenIssuance(_) => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_current_status_and_action() {
        let err = AppError::InvalidState {
            current: InvitationStatus::Declined,
            action: InvitationAction::Accept,
        };
        assert_eq!(err.to_string(), "Invitation status is 'declined', cannot accept");
    }

    #[test]
    fn expired_invitations_report_expiry() {
        let err = AppError::InvalidState {
            current: InvitationStatus::Expired,
            action: InvitationAction::Decline,
        };
        assert_eq!(err.to_string(), "Invitation has expired");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (AppError::NotFound("Role not found".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (AppError::UniqueViolation("uq_invitation_token".into()), StatusCode::CONFLICT),
            (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::TokenIssuance(5), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::InvalidState {
                    current: InvitationStatus::Accepted,
                    action: InvitationAction::Decline,
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
