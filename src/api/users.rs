use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::{validate_password_len, validate_payload, validate_phone_number};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::user::{UserCreate, UserResponse, UserUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:user_id", get(get_user).patch(update_user).delete(delete_user))
}

async fn create_user(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_payload(&payload)?;
    validate_phone_number(&payload.phone_number)?;
    validate_password_len(&payload.password)?;

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username: payload.username.trim(),
            email: payload.email.trim(),
            phone_number: &payload.phone_number,
            hashed_password,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            is_verified: payload.is_verified,
            is_active: payload.is_active,
            is_staff: payload.is_staff,
            is_superuser: payload.is_superuser,
            date_joined: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to create user"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        action = "user_create",
        "Admin created user"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from_db(user))))
}

async fn get_user(
    Path(user_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    if user.id != user_id && !user.is_admin() {
        return Err(ApiError::Forbidden("Not enough permissions"));
    }

    let found = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from_db(found)))
}

async fn update_user(
    Path(user_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    if user.id != user_id && !user.is_admin() {
        return Err(ApiError::Forbidden("Not enough permissions"));
    }
    if payload.touches_privileges() && !user.is_admin() {
        return Err(ApiError::Forbidden("Admin access required"));
    }

    validate_payload(&payload)?;
    if let Some(phone_number) = payload.phone_number.as_deref() {
        validate_phone_number(phone_number)?;
    }

    let exists = repositories::users::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;
    if exists.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let hashed_password = match payload.password.as_deref() {
        Some(password) => {
            validate_password_len(password)?;
            Some(
                security::hash_password(password)
                    .map_err(|e| ApiError::internal(e, "Failed to hash password"))?,
            )
        }
        None => None,
    };

    repositories::users::update(
        state.db(),
        &user_id,
        repositories::users::UpdateUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone_number: payload.phone_number,
            is_verified: payload.is_verified,
            is_active: payload.is_active,
            is_staff: payload.is_staff,
            is_superuser: payload.is_superuser,
            hashed_password,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to update user"))?;

    let updated = repositories::users::fetch_one_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch updated user"))?;

    tracing::info!(
        actor_id = %user.id,
        user_id = %updated.id,
        action = "user_update",
        "User updated"
    );

    Ok(Json(UserResponse::from_db(updated)))
}

async fn delete_user(
    Path(user_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    if admin.id == user_id {
        return Err(ApiError::BadRequest("Admins cannot delete themselves".to_string()));
    }

    let deleted = repositories::users::delete(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete user"))?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, user_id = %user_id, action = "user_delete", "Admin deleted user");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn duplicate_phone_number_is_a_conflict() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db(), "root", "admin-pass").await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let first = json!({
            "username": "alice",
            "email": "alice@example.com",
            "phone_number": "+15550000001",
            "password": "alice-pass"
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::POST, "/api/v1/users", Some(&token), Some(first)))
            .await
            .expect("create first");
        assert_eq!(response.status(), StatusCode::CREATED);

        let second = json!({
            "username": "bob",
            "email": "bob@example.com",
            "phone_number": "+15550000001",
            "password": "bob-password"
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::POST, "/api/v1/users", Some(&token), Some(second)))
            .await
            .expect("create second");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = test_support::read_json(response).await;
        assert_eq!(body["detail"], "phone_number already exists");
    }

    #[tokio::test]
    async fn non_admin_cannot_grant_staff() {
        let ctx = test_support::setup_test_context().await;
        let user = test_support::insert_user(ctx.state.db(), "carol", "carol-pass").await;
        let token = test_support::bearer_token(&user.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/users/{}", user.id),
                Some(&token),
                Some(json!({ "is_staff": true })),
            ))
            .await
            .expect("patch");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::PATCH,
                &format!("/api/v1/users/{}", user.id),
                Some(&token),
                Some(json!({ "first_name": "Carol" })),
            ))
            .await
            .expect("patch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::read_json(response).await;
        assert_eq!(body["first_name"], "Carol");
    }
}
