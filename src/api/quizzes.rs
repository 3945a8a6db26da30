use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{
    load_course, load_student, require_course_manager, require_enrollment,
    require_student_profile, CurrentUser,
};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Course;
use crate::repositories;
use crate::schemas::assessment::{QuizAttempt, QuizResultRecord, QuizResultResponse};
use crate::services::grading;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:quiz_id/results", post(record_result))
        .route("/:quiz_id/attempts", post(submit_attempt))
}

async fn quiz_course(state: &AppState, quiz_id: &str) -> Result<Course, ApiError> {
    let course_id = repositories::quizzes::course_id_for(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))?;
    load_course(state, &course_id).await
}

/// Instructor or admin records a score directly.
async fn record_result(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuizResultRecord>,
) -> Result<Json<QuizResultResponse>, ApiError> {
    validate_payload(&payload)?;
    let course = quiz_course(&state, &quiz_id).await?;
    require_course_manager(&state, &user, &course).await?;
    let student = load_student(&state, &payload.student_id).await?;

    let result = grading::record_quiz_result(
        state.db(),
        &student.id,
        &quiz_id,
        payload.score,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to record quiz result"))?;

    tracing::info!(
        actor_id = %user.id,
        student_id = %student.id,
        quiz_id = %quiz_id,
        score = result.score,
        action = "quiz_result_record",
        "Quiz result recorded"
    );

    Ok(Json(QuizResultResponse::from_db(result)))
}

/// A student answers the quiz and is scored against the correct choices.
async fn submit_attempt(
    Path(quiz_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuizAttempt>,
) -> Result<(StatusCode, Json<QuizResultResponse>), ApiError> {
    let course = quiz_course(&state, &quiz_id).await?;
    let student = require_student_profile(&state, &user).await?;
    require_enrollment(&state, &student, &course).await?;

    let questions = repositories::quizzes::list_questions(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    if questions.is_empty() {
        return Err(ApiError::UnprocessableEntity("Quiz has no questions".to_string()));
    }
    let score = grading::score_attempt(&questions, &payload.answers);

    let result =
        grading::record_quiz_attempt(state.db(), &student.id, &quiz_id, score, primitive_now_utc())
            .await
            .map_err(|e| ApiError::from_write(e, "Failed to record quiz result"))?
            .ok_or_else(|| ApiError::Conflict("Quiz has already been attempted".to_string()))?;

    tracing::info!(
        student_id = %student.id,
        quiz_id = %quiz_id,
        score,
        action = "quiz_attempt",
        "Quiz attempt scored"
    );

    Ok((StatusCode::CREATED, Json(QuizResultResponse::from_db(result))))
}
