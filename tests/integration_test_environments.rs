mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn create(app: &TestApp, uri: &str, payload: Value) -> Value {
    let (status, body) = app.request("POST", uri, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {} failed: {}", uri, body);
    body
}

async fn python_environment(app: &TestApp, name: &str) -> Value {
    create(
        app,
        "/api/v1/execution-environments",
        json!({ "environment_name": name, "language": "python", "version": "3.12" }),
    )
    .await
}

#[tokio::test]
async fn test_file_types_are_unique_by_name() {
    let app = TestApp::new().await;

    let payload = json!({ "type_name": "Rust", "extension": ".rs", "mime_type": "text/x-rust", "syntax_mode": "rust" });
    let rust = create(&app, "/api/v1/file-types", payload.clone()).await;
    assert_eq!(rust["is_executable"], false);
    assert_eq!(rust["is_binary"], false);

    let (status, body) = app.request("POST", "/api/v1/file-types", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "File type already exists");

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/file-types",
            Some(json!({ "type_name": " ", "extension": ".x", "mime_type": "text/plain" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .request(
            "PUT",
            &format!("/api/v1/file-types/{}", rust["file_type_id"].as_str().unwrap()),
            Some(json!({ "icon_class": "icon-rust" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["icon_class"], "icon-rust");
}

#[tokio::test]
async fn test_files_reference_existing_file_types() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let src = create(
        &app,
        "/api/v1/directories",
        json!({ "project_id": seed.project_id, "directory_name": "src", "created_by": seed.owner_id }),
    )
    .await;
    let markdown = create(
        &app,
        "/api/v1/file-types",
        json!({ "type_name": "Markdown", "extension": ".md", "mime_type": "text/markdown" }),
    )
    .await;

    let readme = create(
        &app,
        "/api/v1/files",
        json!({
            "directory_id": src["directory_id"],
            "file_name": "README.md",
            "file_type_id": markdown["file_type_id"],
            "created_by": seed.owner_id
        }),
    )
    .await;
    assert_eq!(readme["file_type_id"], markdown["file_type_id"]);

    let (status, body) = app
        .request(
            "POST",
            "/api/v1/files",
            Some(json!({
                "directory_id": src["directory_id"],
                "file_name": "notes.txt",
                "file_type_id": "missing",
                "created_by": seed.owner_id
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File type not found");

    let uri = format!("/api/v1/files/{}", readme["file_id"].as_str().unwrap());
    let (status, body) = app.request("PUT", &uri, Some(json!({ "file_type_id": "missing" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "File type not found");

    let (status, cleared) = app.request("PUT", &uri, Some(json!({ "file_type_id": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["file_type_id"].is_null());
}

#[tokio::test]
async fn test_execution_environment_defaults_and_filters() {
    let app = TestApp::new().await;

    let python = python_environment(&app, "python-3.12").await;
    assert_eq!(python["timeout_seconds"], 30);
    assert_eq!(python["base_packages"], json!([]));
    assert_eq!(python["setup_commands"], json!([]));
    assert_eq!(python["persistent_storage"], false);
    assert_eq!(python["is_active"], true);

    let node = create(
        &app,
        "/api/v1/execution-environments",
        json!({
            "environment_name": "node-20",
            "language": "javascript",
            "base_packages": ["typescript"],
            "timeout_seconds": 120
        }),
    )
    .await;
    assert_eq!(node["base_packages"], json!(["typescript"]));

    let retired = python_environment(&app, "python-3.8").await;
    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/v1/execution-environments/{}", retired["environment_id"].as_str().unwrap()),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, page) = app
        .request("GET", "/api/v1/execution-environments?language=python&is_active=true", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["environment_name"], "python-3.12");

    let (status, body) = app.request("POST", "/api/v1/execution-environments", Some(json!({
        "environment_name": "python-3.12",
        "language": "python"
    }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Execution environment already exists");
}

#[tokio::test]
async fn test_execution_environment_validation() {
    let app = TestApp::new().await;

    let invalid = [
        (json!({ "environment_name": "a", "language": "go", "base_packages": "numpy" }), "base_packages must be a list"),
        (json!({ "environment_name": "b", "language": "go", "setup_commands": { "run": 1 } }), "setup_commands must be a list"),
        (json!({ "environment_name": "c", "language": "go", "timeout_seconds": 0 }), "timeout_seconds must be positive"),
        (json!({ "environment_name": "", "language": "go" }), "environment_name and language are required"),
    ];
    for (payload, expected) in invalid {
        let (status, body) = app.request("POST", "/api/v1/execution-environments", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }

    let env = python_environment(&app, "python-3.11").await;
    let uri = format!("/api/v1/execution-environments/{}", env["environment_id"].as_str().unwrap());
    let (status, body) = app.request("PUT", &uri, Some(json!({ "timeout_seconds": -5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "timeout_seconds must be positive");

    let (status, body) = app.request("PUT", &uri, Some(json!({ "timeout_seconds": null }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "timeout_seconds must not be null");

    let (status, _) = app.request("PUT", &uri, Some(json!({ "base_packages": "numpy" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .request("PUT", &uri, Some(json!({ "base_packages": ["numpy"], "timeout_seconds": 60 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["base_packages"], json!(["numpy"]));
    assert_eq!(updated["timeout_seconds"], 60);
}

#[tokio::test]
async fn test_terminal_environments_check_references() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let env = python_environment(&app, "python-3.12").await;

    let terminal = create(
        &app,
        "/api/v1/terminal-environments",
        json!({
            "project_id": seed.project_id,
            "user_id": seed.owner_id,
            "environment_id": env["environment_id"],
            "container_id": "c-1",
            "websocket_id": "ws-1"
        }),
    )
    .await;
    assert_eq!(terminal["is_active"], true);

    let missing = [
        (json!({ "project_id": "nope", "user_id": seed.owner_id, "environment_id": env["environment_id"] }), "Project not found"),
        (json!({ "project_id": seed.project_id, "user_id": "nope", "environment_id": env["environment_id"] }), "User not found"),
        (json!({ "project_id": seed.project_id, "user_id": seed.owner_id, "environment_id": "nope" }), "Execution environment not found"),
    ];
    for (mut payload, expected) in missing {
        payload["container_id"] = json!("c-2");
        payload["websocket_id"] = json!("ws-2");
        let (status, body) = app.request("POST", "/api/v1/terminal-environments", Some(payload)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], expected);
    }

    // An environment in use cannot be deleted.
    let env_uri = format!("/api/v1/execution-environments/{}", env["environment_id"].as_str().unwrap());
    let (status, _) = app.request("DELETE", &env_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.request("PUT", &env_uri, Some(json!({ "is_active": false }))).await;
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/terminal-environments",
            Some(json!({
                "project_id": seed.project_id,
                "user_id": seed.owner_id,
                "environment_id": env["environment_id"],
                "container_id": "c-3",
                "websocket_id": "ws-3"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Execution environment is not active");
}

#[tokio::test]
async fn test_terminal_environments_follow_project_deletion() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let env = python_environment(&app, "python-3.12").await;

    let terminal = create(
        &app,
        "/api/v1/terminal-environments",
        json!({
            "project_id": seed.project_id,
            "user_id": seed.owner_id,
            "environment_id": env["environment_id"],
            "container_id": "c-1",
            "websocket_id": "ws-1"
        }),
    )
    .await;

    let (status, _) = app.request("DELETE", &format!("/api/v1/projects/{}", seed.project_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/v1/terminal-environments/{}", terminal["terminal_id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The environment itself is shared and survives.
    let (status, _) = app
        .request(
            "GET",
            &format!("/api/v1/execution-environments/{}", env["environment_id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
