use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{load_course, load_student, require_student_owner, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::GradeMap;
use crate::repositories;
use crate::schemas::assessment::CertificateResponse;
use crate::schemas::commerce::{CartItemCreate, EnrollmentResponse};
use crate::schemas::course::CourseResponse;
use crate::schemas::student::{StudentCreate, StudentResponse, StudentUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student))
        .route("/me", get(my_profile))
        .route("/:student_id", get(get_student).patch(update_student))
        .route("/:student_id/grades", get(get_grades))
        .route("/:student_id/certificate", get(get_certificate))
        .route("/:student_id/cart", get(list_cart).post(add_to_cart))
        .route("/:student_id/cart/:course_id", delete(remove_from_cart))
        .route("/:student_id/enrollments", get(list_enrollments))
}

async fn create_student(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
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

    let student = repositories::students::create(
        state.db(),
        repositories::students::CreateStudent {
            id: &Uuid::new_v4().to_string(),
            user_id: &user_id,
            profile_picture: payload.profile_picture.as_deref(),
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to create student profile"))?;

    tracing::info!(
        actor_id = %user.id,
        student_id = %student.id,
        action = "student_create",
        "Student profile created"
    );

    Ok((StatusCode::CREATED, Json(StudentResponse::from_db(student))))
}

async fn my_profile(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = repositories::students::find_by_user_id(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student profile"))?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    Ok(Json(StudentResponse::from_db(student)))
}

async fn get_student(
    Path(student_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;
    Ok(Json(StudentResponse::from_db(student)))
}

async fn update_student(
    Path(student_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<StudentUpdate>,
) -> Result<Json<StudentResponse>, ApiError> {
    validate_payload(&payload)?;
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;

    repositories::students::update(
        state.db(),
        &student.id,
        repositories::students::UpdateStudent {
            profile_picture: payload.profile_picture,
            track_record: payload.track_record,
            feedback: payload.feedback,
            certificate_photo: payload.certificate_photo,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update student profile"))?;

    let updated = repositories::students::fetch_one_by_id(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch updated student profile"))?;

    Ok(Json(StudentResponse::from_db(updated)))
}

async fn get_grades(
    Path(student_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<GradeMap>, ApiError> {
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;
    Ok(Json(student.grades.0))
}

async fn get_certificate(
    Path(student_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CertificateResponse>, ApiError> {
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;

    let certificate = repositories::certificates::find_by_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch certificate"))?
        .ok_or_else(|| ApiError::NotFound("Certificate not found".to_string()))?;

    Ok(Json(CertificateResponse::from_db(certificate)))
}

async fn list_cart(
    Path(student_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;

    let courses = repositories::carts::list_courses(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list cart"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn add_to_cart(
    Path(student_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CartItemCreate>,
) -> Result<(StatusCode, Json<Vec<CourseResponse>>), ApiError> {
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;
    let course = load_course(&state, &payload.course_id).await?;

    repositories::carts::add(state.db(), &student.id, &course.id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::from_write(e, "Failed to add course to cart"))?;

    let courses = repositories::carts::list_courses(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list cart"))?;

    Ok((StatusCode::CREATED, Json(courses.into_iter().map(CourseResponse::from_db).collect())))
}

async fn remove_from_cart(
    Path((student_id, course_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;

    let removed = repositories::carts::remove(state.db(), &student.id, &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to remove course from cart"))?;
    if !removed {
        return Err(ApiError::NotFound("Course is not in the cart".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn list_enrollments(
    Path(student_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let student = load_student(&state, &student_id).await?;
    require_student_owner(&user, &student)?;

    let enrollments = repositories::enrollments::list_for_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;

    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from_db).collect()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn second_student_profile_for_user_conflicts() {
        let ctx = test_support::setup_test_context().await;
        let user = test_support::insert_user(ctx.state.db(), "dave", "dave-pass").await;
        let token = test_support::bearer_token(&user.id, ctx.state.settings());

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::json_request(
                    Method::POST,
                    "/api/v1/students",
                    Some(&token),
                    Some(json!({})),
                ))
                .await
                .expect("create student");
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn cart_add_is_idempotent_and_private() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();
        let (course, _) = test_support::course_with_instructor(db, ctx.state.settings()).await;
        let user = test_support::insert_user(db, "erin", "erin-pass").await;
        let student = test_support::insert_student(db, &user).await;
        let token = test_support::bearer_token(&user.id, ctx.state.settings());
        let uri = format!("/api/v1/students/{}/cart", student.id);

        for _ in 0..2 {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::json_request(
                    Method::POST,
                    &uri,
                    Some(&token),
                    Some(json!({ "course_id": course.id })),
                ))
                .await
                .expect("add to cart");
            assert_eq!(response.status(), StatusCode::CREATED);
            let body = test_support::read_json(response).await;
            assert_eq!(body.as_array().map(Vec::len), Some(1));
        }

        let stranger = test_support::insert_user(db, "mallory", "mallory-pass").await;
        let stranger_token = test_support::bearer_token(&stranger.id, ctx.state.settings());
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, &uri, Some(&stranger_token), None))
            .await
            .expect("list cart");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
