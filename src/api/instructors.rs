use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::student::{InstructorCreate, InstructorResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_instructor))
        .route("/:instructor_id", get(get_instructor))
}

async fn create_instructor(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<InstructorCreate>,
) -> Result<(StatusCode, Json<InstructorResponse>), ApiError> {
    validate_payload(&payload)?;

    let user_id = match payload.user_id.as_deref() {
        Some(target) if target != user.id => {
            if !user.is_admin() {
                return Err(ApiError::Forbidden("Admin access required"));
            }
            target.to_string()
        }
        _ => user.id.clone(),
    };

    let instructor = repositories::instructors::create(
        state.db(),
        repositories::instructors::CreateInstructor {
            id: &Uuid::new_v4().to_string(),
            user_id: &user_id,
            profile_picture: payload.profile_picture.as_deref(),
            verification_code: payload.verification_code.as_deref(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to create instructor profile"))?;

    tracing::info!(
        actor_id = %user.id,
        instructor_id = %instructor.id,
        action = "instructor_create",
        "Instructor profile created"
    );

    Ok((StatusCode::CREATED, Json(InstructorResponse::from_db(instructor))))
}

async fn get_instructor(
    Path(instructor_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<InstructorResponse>, ApiError> {
    let instructor = repositories::instructors::find_by_id(state.db(), &instructor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch instructor"))?
        .ok_or_else(|| ApiError::NotFound("Instructor not found".to_string()))?;

    Ok(Json(InstructorResponse::from_db(instructor)))
}
