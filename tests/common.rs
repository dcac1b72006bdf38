use collab_backend::{
    api::router::create_router,
    config::Config,
    domain::services::token_issuer::{RandomTokenSource, TokenSource},
    infra::store::Store,
    state::AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_tokens(Arc::new(RandomTokenSource)).await
    }

    pub async fn with_tokens(tokens: Arc<dyn TokenSource>) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let config = Config {
            database_url: format!("sqlite://{}?mode=rwc", db_filename),
            port: 0,
            ..Config::default()
        };

        let store = Store::connect(&config).await.expect("Failed to open test db");
        let state = Arc::new(AppState::with_token_source(config, store.clone(), tokens));
        let router = create_router(state.clone());

        Self {
            router,
            store,
            db_filename,
            state,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(payload) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn create_user(&self, username: &str, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/users",
                Some(json!({
                    "username": username,
                    "email": email,
                    "password": "s3cret-passw0rd",
                    "full_name": username
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create user failed: {}", body);
        body["user_id"].as_str().unwrap().to_string()
    }

    pub async fn create_project(&self, name: &str, owner_id: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/projects",
                Some(json!({ "project_name": name, "owner_id": owner_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
        body["project_id"].as_str().unwrap().to_string()
    }

    pub async fn create_role(&self, name: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/roles",
                Some(json!({ "role_name": name, "permissions": { "read": true, "write": name != "Viewer" } })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create role failed: {}", body);
        body["role_id"].as_str().unwrap().to_string()
    }

    /// Owner, project and role ready for inviting people.
    pub async fn seed_project(&self) -> Seed {
        let owner_id = self.create_user("owner", "owner@x.com").await;
        let project_id = self.create_project("Apollo", &owner_id).await;
        let role_id = self.create_role("Editor").await;
        Seed { owner_id, project_id, role_id }
    }

    pub async fn invite(&self, seed: &Seed, email: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/api/v1/project-invitations",
            Some(json!({
                "project_id": seed.project_id,
                "email": email,
                "role_id": seed.role_id,
                "invited_by": seed.owner_id
            })),
        )
        .await
    }
}

#[allow(dead_code)]
pub struct Seed {
    pub owner_id: String,
    pub project_id: String,
    pub role_id: String,
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
