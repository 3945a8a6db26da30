use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{is_course_manager, load_course, require_course_manager, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::repositories;
use crate::schemas::assessment::{ExamCreate, ExamResponse};
use crate::schemas::course::{
    LessonCreate, LessonResponse, QuestionCreate, QuestionResponse, QuizResponse,
};
use crate::services::catalog::{self, CatalogError};

pub(crate) async fn get_lesson(
    Path(course_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<LessonResponse>, ApiError> {
    let lesson = repositories::lessons::find_by_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Course has no lesson".to_string()))?;

    Ok(Json(LessonResponse::from_db(lesson)))
}

pub(crate) async fn create_lesson(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<LessonCreate>,
) -> Result<(StatusCode, Json<LessonResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    let lesson = catalog::add_lesson(
        state.db(),
        repositories::lessons::CreateLesson {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            title: payload.title.trim(),
            description: &payload.description,
            video_path: &payload.video_path,
            slides_path: &payload.slides_path,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|err| match err {
        CatalogError::CourseNotFound => ApiError::NotFound("Course not found".to_string()),
        CatalogError::LessonLimitReached => {
            ApiError::UnprocessableEntity(CatalogError::LessonLimitReached.to_string())
        }
        CatalogError::Database(e) => ApiError::internal(e, "Failed to create lesson"),
    })?;

    tracing::info!(
        actor_id = %user.id,
        course_id = %course.id,
        lesson_id = %lesson.id,
        action = "lesson_create",
        "Lesson created"
    );

    Ok((StatusCode::CREATED, Json(LessonResponse::from_db(lesson))))
}

pub(crate) async fn get_quiz(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuizResponse>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    let quiz = repositories::quizzes::find_for_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Course has no quiz".to_string()))?;

    let reveal = is_course_manager(&state, &user, &course).await?;
    let questions = repositories::quizzes::list_questions(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?
        .into_iter()
        .map(|question| QuestionResponse::from_db(question, reveal))
        .collect();

    Ok(Json(QuizResponse::from_db(quiz, questions)))
}

pub(crate) async fn create_quiz(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    let course = load_course(&state, &course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    let lesson = repositories::lessons::find_by_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| {
            ApiError::UnprocessableEntity("A quiz requires the course to have a lesson".to_string())
        })?;

    let quiz = repositories::quizzes::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &lesson.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to create quiz"))?;

    tracing::info!(
        actor_id = %user.id,
        course_id = %course.id,
        quiz_id = %quiz.id,
        action = "quiz_create",
        "Quiz created"
    );

    Ok((StatusCode::CREATED, Json(QuizResponse::from_db(quiz, Vec::new()))))
}

pub(crate) async fn add_question(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    let quiz = repositories::quizzes::find_for_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Course has no quiz".to_string()))?;

    let question = repositories::quizzes::create_question(
        state.db(),
        repositories::quizzes::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            quiz_id: &quiz.id,
            text: &payload.text,
            choices: [
                payload.choice_a.as_str(),
                payload.choice_b.as_str(),
                payload.choice_c.as_str(),
                payload.choice_d.as_str(),
            ],
            correct_choice: payload.correct_choice,
            order_index: payload.order_index,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question, true))))
}

pub(crate) async fn get_exam(
    Path(course_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = repositories::exams::find_by_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Course has no exam".to_string()))?;

    Ok(Json(ExamResponse::from_db(exam)))
}

pub(crate) async fn create_exam(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            title: payload.title.trim(),
            description: &payload.description,
            exam_date: to_primitive_utc(payload.exam_date),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to create exam"))?;

    tracing::info!(
        actor_id = %user.id,
        course_id = %course.id,
        exam_id = %exam.id,
        action = "exam_create",
        "Exam created"
    );

    Ok((StatusCode::CREATED, Json(ExamResponse::from_db(exam))))
}
