use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{load_course, require_course_manager, CurrentUser};
use crate::api::pagination::{normalize, PaginatedResponse};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::courses::CourseFilter;
use crate::schemas::course::{CourseCreate, CourseListQuery, CourseResponse, CourseUpdate};

pub(crate) async fn list_courses(
    Query(params): Query<CourseListQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<CourseResponse>>, ApiError> {
    let (skip, limit) = normalize(params.skip, params.limit);

    // Instructors see their own drafts; everyone else only published courses.
    let own_instructor = repositories::instructors::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch instructor profile"))?;
    let lists_own = match (&own_instructor, &params.instructor_id) {
        (Some(instructor), Some(requested)) => &instructor.id == requested,
        _ => false,
    };

    let filter = CourseFilter {
        category_id: params.category_id,
        instructor_id: params.instructor_id,
        published_only: !(user.is_admin() || lists_own),
    };

    let (courses, total_count) = repositories::courses::list(state.db(), &filter, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(PaginatedResponse {
        items: courses.into_iter().map(CourseResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

pub(crate) async fn create_course(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    validate_payload(&payload)?;

    let own_instructor = repositories::instructors::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch instructor profile"))?;

    let instructor_id = match (payload.instructor_id, own_instructor) {
        (Some(requested), Some(own)) if requested == own.id => own.id,
        (Some(requested), _) if user.is_admin() => requested,
        (None, Some(own)) => own.id,
        (Some(_), _) => return Err(ApiError::Forbidden("Admin access required")),
        (None, None) => return Err(ApiError::Forbidden("Instructor profile required")),
    };

    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            category_id: &payload.category_id,
            instructor_id: &instructor_id,
            title: payload.title.trim(),
            slug: payload.slug.trim(),
            description: &payload.description,
            price_cents: payload.price_cents,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to create course"))?;

    tracing::info!(
        actor_id = %user.id,
        course_id = %course.id,
        action = "course_create",
        "Course created"
    );

    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

pub(crate) async fn get_course(
    Path(course_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    Ok(Json(CourseResponse::from_db(course)))
}

pub(crate) async fn update_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    if payload.is_approved.is_some() && !user.is_admin() {
        return Err(ApiError::Forbidden("Only admins can approve courses"));
    }

    let updated = repositories::courses::update(
        state.db(),
        &course.id,
        repositories::courses::UpdateCourse {
            title: payload.title,
            description: payload.description,
            price_cents: payload.price_cents,
            is_approved: payload.is_approved,
            is_published: payload.is_published,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update course"))?;
    if !updated {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let course = repositories::courses::fetch_one_by_id(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch updated course"))?;

    tracing::info!(
        actor_id = %user.id,
        course_id = %course.id,
        action = "course_update",
        "Course updated"
    );

    Ok(Json(CourseResponse::from_db(course)))
}

pub(crate) async fn delete_course(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let course = load_course(&state, &course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    repositories::courses::delete(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;

    tracing::info!(
        actor_id = %user.id,
        course_id = %course.id,
        action = "course_delete",
        "Course deleted with its lessons, exams and records"
    );

    Ok(StatusCode::NO_CONTENT)
}
