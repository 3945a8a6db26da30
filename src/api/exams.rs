use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{load_course, load_student, require_course_manager, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Course, Exam};
use crate::repositories;
use crate::schemas::assessment::{ExamResponse, ExamScoreRecord, ExamScoreResponse, ExamStatusUpdate};
use crate::services::grading;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:exam_id", get(get_exam).patch(update_status))
        .route("/:exam_id/scores", post(record_score))
}

async fn load_exam(state: &AppState, exam_id: &str) -> Result<(Exam, Course), ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;
    let course = load_course(state, &exam.course_id).await?;
    Ok((exam, course))
}

async fn get_exam(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let (exam, _) = load_exam(&state, &exam_id).await?;
    Ok(Json(ExamResponse::from_db(exam)))
}

/// Exam status is shared by every student of the course.
async fn update_status(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamStatusUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    let (exam, course) = load_exam(&state, &exam_id).await?;
    require_course_manager(&state, &user, &course).await?;

    let updated =
        repositories::exams::update_status(state.db(), &exam.id, payload.status, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update exam"))?
            .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    tracing::info!(
        actor_id = %user.id,
        exam_id = %updated.id,
        from = exam.status.as_str(),
        to = updated.status.as_str(),
        action = "exam_status_update",
        "Exam status updated"
    );

    Ok(Json(ExamResponse::from_db(updated)))
}

async fn record_score(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamScoreRecord>,
) -> Result<Json<ExamScoreResponse>, ApiError> {
    validate_payload(&payload)?;
    let (exam, course) = load_exam(&state, &exam_id).await?;
    require_course_manager(&state, &user, &course).await?;
    let student = load_student(&state, &payload.student_id).await?;

    let written =
        grading::record_exam_score(state.db(), &student.id, &exam.id, payload.score, primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to record exam score"))?;
    if !written {
        return Err(ApiError::NotFound("Student not found".to_string()));
    }

    tracing::info!(
        actor_id = %user.id,
        student_id = %student.id,
        exam_id = %exam.id,
        score = payload.score,
        action = "exam_score_record",
        "Exam score recorded"
    );

    Ok(Json(ExamScoreResponse {
        key: grading::exam_key(&exam.id),
        exam_id: exam.id,
        student_id: student.id,
        score: payload.score,
    }))
}
