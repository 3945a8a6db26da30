use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Course, Student, User};
use crate::repositories;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = repositories::users::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.is_admin() {
            Ok(CurrentAdmin(user))
        } else {
            Err(ApiError::Forbidden("Admin access required"))
        }
    }
}

pub(crate) async fn load_course(state: &AppState, course_id: &str) -> Result<Course, ApiError> {
    repositories::courses::find_by_id(state.db(), course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
}

/// Admins and the course's own instructor manage its content and grades.
pub(crate) async fn is_course_manager(
    state: &AppState,
    user: &User,
    course: &Course,
) -> Result<bool, ApiError> {
    if user.is_admin() {
        return Ok(true);
    }

    let instructor = repositories::instructors::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch instructor profile"))?;

    Ok(instructor.is_some_and(|instructor| instructor.id == course.instructor_id))
}

pub(crate) async fn require_course_manager(
    state: &AppState,
    user: &User,
    course: &Course,
) -> Result<(), ApiError> {
    if is_course_manager(state, user, course).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not enough permissions for this course"))
    }
}

pub(crate) async fn require_student_profile(
    state: &AppState,
    user: &User,
) -> Result<Student, ApiError> {
    repositories::students::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student profile"))?
        .ok_or(ApiError::Forbidden("Student profile required"))
}

pub(crate) async fn load_student(state: &AppState, student_id: &str) -> Result<Student, ApiError> {
    repositories::students::find_by_id(state.db(), student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))
}

/// Course managers may act on any named student; everyone else only on
/// their own student profile.
pub(crate) async fn resolve_student_for_course(
    state: &AppState,
    user: &User,
    course: &Course,
    requested: Option<&str>,
) -> Result<Student, ApiError> {
    let own = repositories::students::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student profile"))?;

    match (requested, own) {
        (None, Some(own)) => Ok(own),
        (Some(requested), Some(own)) if own.id == requested => Ok(own),
        (Some(requested), _) => {
            require_course_manager(state, user, course).await?;
            load_student(state, requested).await
        }
        (None, None) => Err(ApiError::Forbidden("Student profile required")),
    }
}

/// Coursework and certificates are reserved for students enrolled through an
/// approved payment.
pub(crate) async fn require_enrollment(
    state: &AppState,
    student: &Student,
    course: &Course,
) -> Result<(), ApiError> {
    let enrolled = repositories::enrollments::exists(state.db(), &student.id, &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?;

    if enrolled {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Student is not enrolled in this course"))
    }
}

/// Admins may touch any student; others only their own profile.
pub(crate) fn require_student_owner(user: &User, student: &Student) -> Result<(), ApiError> {
    if user.is_admin() || student.user_id == user.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not enough permissions for this student"))
    }
}
