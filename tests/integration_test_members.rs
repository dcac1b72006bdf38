mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_direct_add_and_duplicate() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let nina = app.create_user("nina", "n@x.com").await;

    let payload = json!({
        "project_id": seed.project_id,
        "user_id": nina,
        "role_id": seed.role_id,
        "invited_by": seed.owner_id
    });

    let (status, member) = app.request("POST", "/api/v1/project-members", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member["is_active"], true);
    assert_eq!(member["invited_by"], seed.owner_id.as_str());

    let (status, body) = app.request("POST", "/api/v1/project-members", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User is already a member of this project");
}

#[tokio::test]
async fn test_direct_add_requires_existing_records() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let omar = app.create_user("omar", "o@x.com").await;

    let cases = [
        (json!({ "project_id": "nope", "user_id": omar, "role_id": seed.role_id }), "Project not found"),
        (json!({ "project_id": seed.project_id, "user_id": "nope", "role_id": seed.role_id }), "User not found"),
        (json!({ "project_id": seed.project_id, "user_id": omar, "role_id": "nope" }), "Role not found"),
    ];

    for (payload, expected) in cases {
        let (status, body) = app.request("POST", "/api/v1/project-members", Some(payload)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], expected);
    }
}

#[tokio::test]
async fn test_remove_deactivates_and_allows_readd() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let pia = app.create_user("pia", "p@x.com").await;

    let payload = json!({ "project_id": seed.project_id, "user_id": pia, "role_id": seed.role_id });
    let (_, member) = app.request("POST", "/api/v1/project-members", Some(payload.clone())).await;
    let uri = format!("/api/v1/project-members/{}", member["project_member_id"].as_str().unwrap());

    let (status, removed) = app.request("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["is_active"], false);

    // The row survives deactivation.
    let (status, fetched) = app.request("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["is_active"], false);

    let (status, readded) = app.request("POST", "/api/v1/project-members", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(readded["project_member_id"], member["project_member_id"]);

    let (_, active) = app
        .request(
            "GET",
            &format!("/api/v1/project-members?project_id={}&is_active=true", seed.project_id),
            None,
        )
        .await;
    assert_eq!(active["total"], 1);

    let (_, all) = app
        .request("GET", &format!("/api/v1/project-members?user_id={}", pia), None)
        .await;
    assert_eq!(all["total"], 2);

    let (status, _) = app.request("DELETE", "/api/v1/project-members/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_member_role_and_activity() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let viewer = app.create_role("Viewer").await;
    let quinn = app.create_user("quinn", "q@x.com").await;

    let (_, member) = app
        .request(
            "POST",
            "/api/v1/project-members",
            Some(json!({ "project_id": seed.project_id, "user_id": quinn, "role_id": seed.role_id })),
        )
        .await;
    let uri = format!("/api/v1/project-members/{}", member["project_member_id"].as_str().unwrap());

    let (status, updated) = app
        .request(
            "PUT",
            &uri,
            Some(json!({ "role_id": viewer, "last_activity": "2030-01-01T12:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role_id"], viewer.as_str());
    assert_eq!(updated["user_id"], quinn.as_str());
    assert!(updated["last_activity"].as_str().unwrap().starts_with("2030-01-01T12:00:00"));

    let (status, body) = app.request("PUT", &uri, Some(json!({ "role_id": "nope" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Role not found");
}

#[tokio::test]
async fn test_project_members_lists_owner_first() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let rosa = app.create_user("rosa", "r@x.com").await;

    app.request(
        "POST",
        "/api/v1/project-members",
        Some(json!({ "project_id": seed.project_id, "user_id": rosa, "role_id": seed.role_id })),
    )
    .await;

    let (status, members) = app
        .request("GET", &format!("/api/v1/projects/{}/members", seed.project_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 2);

    assert_eq!(members[0]["membership"], "owner_implicit");
    assert_eq!(members[0]["user_id"], seed.owner_id.as_str());
    assert!(members[0]["role_id"].is_null());

    assert_eq!(members[1]["membership"], "explicit_member");
    assert_eq!(members[1]["user_id"], rosa.as_str());
}

#[tokio::test]
async fn test_owner_entry_carries_owner_role_when_defined() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let owner_role = app.create_role("Owner").await;

    let (_, members) = app
        .request("GET", &format!("/api/v1/projects/{}/members", seed.project_id), None)
        .await;
    assert_eq!(members[0]["membership"], "owner_implicit");
    assert_eq!(members[0]["role_id"], owner_role.as_str());
}

#[tokio::test]
async fn test_explicit_owner_membership_replaces_implicit_entry() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;

    app.request(
        "POST",
        "/api/v1/project-members",
        Some(json!({ "project_id": seed.project_id, "user_id": seed.owner_id, "role_id": seed.role_id })),
    )
    .await;

    let (_, members) = app
        .request("GET", &format!("/api/v1/projects/{}/members", seed.project_id), None)
        .await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["membership"], "explicit_member");
}

#[tokio::test]
async fn test_explicit_owner_row_sorts_ahead_of_earlier_members() {
    let app = TestApp::new().await;
    let seed = app.seed_project().await;
    let quinn = app.create_user("quinn", "q@x.com").await;
    let rosa = app.create_user("rosa", "r@x.com").await;

    for user_id in [&quinn, &seed.owner_id, &rosa] {
        let (status, _) = app
            .request(
                "POST",
                "/api/v1/project-members",
                Some(json!({ "project_id": seed.project_id, "user_id": user_id, "role_id": seed.role_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, members) = app
        .request("GET", &format!("/api/v1/projects/{}/members", seed.project_id), None)
        .await;
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 3);
    assert_eq!(members[0]["membership"], "explicit_member");
    assert_eq!(members[0]["user_id"], seed.owner_id.as_str());
    assert_eq!(members[1]["user_id"], quinn.as_str());
    assert_eq!(members[2]["user_id"], rosa.as_str());
}

#[tokio::test]
async fn test_project_members_of_unknown_project() {
    let app = TestApp::new().await;
    let (status, body) = app.request("GET", "/api/v1/projects/missing/members", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");
}
