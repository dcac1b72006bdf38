use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use argon2::{password_hash::{PasswordHasher, SaltString}, Argon2};
use rand::rngs::OsRng;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::dtos::requests::CreateUserRequest;
use crate::api::dtos::responses::Page;
use crate::api::extractors::pagination::{Pagination, PAGINATION_KEYS};
use crate::domain::entity::{Entity, FieldValue, Filter, Patch};
use crate::domain::models::user::{User, USER_STATUSES};
use crate::domain::services::admission::normalize_email;
use crate::error::AppError;
use crate::state::AppState;

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            AppError::Internal
        })
}

fn check_status(patch: &Patch) -> Result<(), AppError> {
    match patch.get("status") {
        Some(FieldValue::Text(Some(status))) if USER_STATUSES.contains(&status.as_str()) => Ok(()),
        Some(_) => Err(AppError::Validation(format!("status must be one of: {}", USER_STATUSES.join(", ")))),
        None => Ok(()),
    }
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&payload.email)?;
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::Validation("Password must be at least 8 characters".into()));
    }

    if state.store.find_one::<User>(&Filter::new().eq("email", email.as_str())).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }
    if state.store.find_one::<User>(&Filter::new().eq("username", username.as_str())).await?.is_some() {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let mut user = User::new(username, email, hash_password(&payload.password)?, payload.full_name);
    user.avatar_url = payload.avatar_url;

    let created = state.store.create(&user).await.map_err(|e| match e {
        AppError::UniqueViolation(target) if target.contains("email") => {
            AppError::Conflict("Email already registered".into())
        }
        AppError::UniqueViolation(_) => AppError::Conflict("Username already taken".into()),
        other => other,
    })?;

    info!("Created user: {}", created.user_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    pagination: Pagination,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = Filter::from_query(User::DESCRIPTOR, &params, PAGINATION_KEYS)?;
    let items = state.store.list::<User>(&filter, pagination.skip, pagination.limit).await?;
    let total = state.store.count::<User>(&filter).await?;
    Ok(Json(Page::new(items, total, pagination)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store
        .get::<User>(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, AppError> {
    let patch = Patch::from_json(User::DESCRIPTOR, body)?;
    check_status(&patch)?;
    let updated = state.store.update::<User>(&user_id, &patch).await?;
    info!("Updated user: {}", updated.user_id);
    Ok(Json(updated))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state
        .store
        .delete::<User>(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!("Deleted user: {}", removed.user_id);
    Ok(Json(removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{password_hash::PasswordHash, PasswordVerifier};

    #[test]
    fn hashes_are_salted_phc_strings() {
        let first = hash_password("correct horse").unwrap();
        let second = hash_password("correct horse").unwrap();
        assert!(first.starts_with("$argon2"));
        assert_ne!(first, second);

        let parsed = PasswordHash::new(&first).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn status_updates_are_restricted() {
        assert!(check_status(&Patch::new().set("status", "suspended")).is_ok());
        assert!(check_status(&Patch::new().set("status", "banned")).is_err());
        assert!(check_status(&Patch::new().set("full_name", "Ada")).is_ok());
    }
}
