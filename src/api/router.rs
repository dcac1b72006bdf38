use axum::{
    body::Body,
    extract::Request,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

use crate::api::handlers::{health, invitation, member, project, resource, role, user};
use crate::domain::models::connection::WebSocketConnection;
use crate::domain::models::directory::Directory;
use crate::domain::models::environment::{ExecutionEnvironment, TerminalEnvironment};
use crate::domain::models::file::{File, FileVersion};
use crate::domain::models::file_type::FileType;
use crate::domain::models::notification::Notification;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Users
        .route("/api/v1/users", post(user::create_user).get(user::list_users))
        .route("/api/v1/users/{id}", get(user::get_user).put(user::update_user).delete(user::delete_user))

        // Projects
        .route("/api/v1/projects", post(project::create_project).get(project::list_projects))
        .route("/api/v1/projects/{id}", get(project::get_project).put(project::update_project).delete(project::delete_project))
        .route("/api/v1/projects/{id}/members", get(project::list_project_members))

        // Roles
        .route("/api/v1/roles", post(role::create_role).get(role::list_roles))
        .route("/api/v1/roles/{id}", get(role::get_role).put(role::update_role).delete(role::delete_role))

        // Memberships
        .route("/api/v1/project-members", post(member::create_member).get(member::list_members))
        .route("/api/v1/project-members/{id}", get(member::get_member).put(member::update_member).delete(member::delete_member))

        // Invitations
        .route("/api/v1/project-invitations", post(invitation::create_invitation).get(invitation::list_invitations))
        .route("/api/v1/project-invitations/by-token/{token}", get(invitation::get_invitation_by_token))
        .route("/api/v1/project-invitations/by-email/{email}", get(invitation::list_invitations_by_email))
        .route("/api/v1/project-invitations/{id}", get(invitation::get_invitation).delete(invitation::delete_invitation))
        .route("/api/v1/project-invitations/{id}/accept", post(invitation::accept_invitation))
        .route("/api/v1/project-invitations/{id}/decline", post(invitation::decline_invitation))

        // Workspace records
        .route("/api/v1/directories", post(resource::create::<Directory>).get(resource::list::<Directory>))
        .route("/api/v1/directories/{id}", get(resource::get::<Directory>).delete(resource::delete::<Directory>))
        .route("/api/v1/file-types", post(resource::create::<FileType>).get(resource::list::<FileType>))
        .route("/api/v1/file-types/{id}", get(resource::get::<FileType>).put(resource::update::<FileType>).delete(resource::delete::<FileType>))
        .route("/api/v1/files", post(resource::create::<File>).get(resource::list::<File>))
        .route("/api/v1/files/{id}", get(resource::get::<File>).put(resource::update::<File>).delete(resource::delete::<File>))
        .route("/api/v1/file-versions", post(resource::create::<FileVersion>).get(resource::list::<FileVersion>))
        .route("/api/v1/file-versions/{id}", get(resource::get::<FileVersion>).put(resource::update::<FileVersion>).delete(resource::delete::<FileVersion>))
        .route("/api/v1/notifications", post(resource::create::<Notification>).get(resource::list::<Notification>))
        .route("/api/v1/notifications/{id}", get(resource::get::<Notification>).put(resource::update::<Notification>).delete(resource::delete::<Notification>))
        .route("/api/v1/websocket-connections", post(resource::create::<WebSocketConnection>).get(resource::list::<WebSocketConnection>))
        .route("/api/v1/websocket-connections/{id}", get(resource::get::<WebSocketConnection>).put(resource::update::<WebSocketConnection>).delete(resource::delete::<WebSocketConnection>))
        .route("/api/v1/execution-environments", post(resource::create::<ExecutionEnvironment>).get(resource::list::<ExecutionEnvironment>))
        .route("/api/v1/execution-environments/{id}", get(resource::get::<ExecutionEnvironment>).put(resource::update::<ExecutionEnvironment>).delete(resource::delete::<ExecutionEnvironment>))
        .route("/api/v1/terminal-environments", post(resource::create::<TerminalEnvironment>).get(resource::list::<TerminalEnvironment>))
        .route("/api/v1/terminal-environments/{id}", get(resource::get::<TerminalEnvironment>).put(resource::update::<TerminalEnvironment>).delete(resource::delete::<TerminalEnvironment>))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
