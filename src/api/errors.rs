use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    UnprocessableEntity(String),
    TooManyRequests(&'static str),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    /// Maps a failed insert/update: unique violations become 409 naming the
    /// field, missing parents become 400, anything else is internal.
    pub(crate) fn from_write(err: sqlx::Error, context: &str) -> Self {
        if let Some(constraint) = db::unique_violation(&err) {
            let field = unique_field(&constraint);
            tracing::info!(constraint = %constraint, "Uniqueness violation");
            return Self::Conflict(format!("{field} already exists"));
        }
        if let Some(constraint) = db::foreign_key_violation(&err) {
            tracing::info!(constraint = %constraint, "Foreign key violation");
            return Self::BadRequest(format!("Referenced {} does not exist", parent_of(&constraint)));
        }
        Self::internal(err, context)
    }
}

fn unique_field(constraint: &str) -> &'static str {
    match constraint {
        "users_username_key" => "username",
        "users_email_key" => "email",
        "users_phone_number_key" => "phone_number",
        "payments_reference_number_key" => "reference_number",
        "students_user_id_key" => "Student profile for this user",
        "instructors_user_id_key" => "Instructor profile for this user",
        "lessons_course_id_key" => "Lesson for this course",
        "quizzes_lesson_id_key" => "Quiz for this lesson",
        "exams_course_id_key" => "Exam for this course",
        "certificates_student_id_key" => "Certificate for this student",
        "enrollments_student_course_key" => "Enrollment",
        _ => "Record",
    }
}

// Constraint names follow Postgres' `<table>_<parent>_id_fkey` default.
fn parent_of(constraint: &str) -> &str {
    constraint
        .strip_suffix("_id_fkey")
        .and_then(|rest| rest.rsplit('_').next())
        .filter(|parent| !parent.is_empty())
        .unwrap_or("record")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                let status = StatusCode::UNAUTHORIZED;
                let mut response = (
                    status,
                    Json(ErrorResponse { status: status.as_u16(), detail: message.to_string() }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
            ApiError::Forbidden(message) => {
                let status = StatusCode::FORBIDDEN;
                (
                    status,
                    Json(ErrorResponse { status: status.as_u16(), detail: message.to_string() }),
                )
                    .into_response()
            }
            ApiError::BadRequest(message) => {
                let status = StatusCode::BAD_REQUEST;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
            ApiError::NotFound(message) => {
                let status = StatusCode::NOT_FOUND;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
            ApiError::Conflict(message) => {
                let status = StatusCode::CONFLICT;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
            ApiError::UnprocessableEntity(message) => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
            ApiError::TooManyRequests(message) => {
                let status = StatusCode::TOO_MANY_REQUESTS;
                (
                    status,
                    Json(ErrorResponse { status: status.as_u16(), detail: message.to_string() }),
                )
                    .into_response()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                (status, Json(ErrorResponse { status: status.as_u16(), detail: message }))
                    .into_response()
            }
        }
    }
}
