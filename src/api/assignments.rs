use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{is_course_manager, load_course, require_course_manager, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Assignment;
use crate::db::types::AssignmentStatus;
use crate::repositories;
use crate::schemas::assessment::{AssignmentResponse, AssignmentUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/:assignment_id", get(get_assignment).patch(grade_assignment))
}

async fn load_assignment(state: &AppState, assignment_id: &str) -> Result<Assignment, ApiError> {
    repositories::assignments::find_by_id(state.db(), assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))
}

async fn get_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = load_assignment(&state, &assignment_id).await?;

    let owner = repositories::students::find_by_id(state.db(), &assignment.student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?;
    let is_owner = owner.is_some_and(|student| student.user_id == user.id);
    if !is_owner {
        let course = load_course(&state, &assignment.course_id).await?;
        if !is_course_manager(&state, &user, &course).await? {
            return Err(ApiError::Forbidden("Not enough permissions for this assignment"));
        }
    }

    Ok(Json(AssignmentResponse::from_db(assignment)))
}

/// Recording a grade without an explicit status marks the assignment graded.
async fn grade_assignment(
    Path(assignment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentUpdate>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    validate_payload(&payload)?;
    let assignment = load_assignment(&state, &assignment_id).await?;
    let course = load_course(&state, &assignment.course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    let status = match (payload.status, payload.grade) {
        (Some(status), _) => Some(status),
        (None, Some(_)) => Some(AssignmentStatus::Graded),
        (None, None) => None,
    };

    let updated = repositories::assignments::update(
        state.db(),
        &assignment.id,
        repositories::assignments::UpdateAssignment {
            status,
            grade: payload.grade,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update assignment"))?
    .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))?;

    tracing::info!(
        actor_id = %user.id,
        assignment_id = %updated.id,
        status = updated.status.as_str(),
        grade = ?updated.grade,
        action = "assignment_grade",
        "Assignment updated"
    );

    Ok(Json(AssignmentResponse::from_db(updated)))
}
