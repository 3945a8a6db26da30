use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{
    load_course, require_course_manager, require_enrollment, require_student_profile,
    resolve_student_for_course, CurrentUser,
};
use crate::api::validation::validate_payload;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, today_utc};
use crate::repositories;
use crate::schemas::assessment::{
    AssignmentCreate, AssignmentResponse, CertificateCreate, CertificateResponse, EligibilityResponse,
    FeedbackCreate, FeedbackResponse, FinalGradeResponse, ProgressResponse, StudentQuery,
};
use crate::services::grading;

const DEFAULT_COMPANY_LOGO: &str = "certificates/company_logo.png";

pub(crate) async fn list_assignments(
    Path(course_id): Path<String>,
    Query(query): Query<StudentQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    let student =
        resolve_student_for_course(&state, &user, &course, query.student_id.as_deref()).await?;

    let assignments =
        repositories::assignments::list_for_student_course(state.db(), &student.id, &course.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from_db).collect()))
}

pub(crate) async fn submit_assignment(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &course_id).await?;
    let student = require_student_profile(&state, &user).await?;
    require_enrollment(&state, &student, &course).await?;

    let assignment = repositories::assignments::create(
        state.db(),
        repositories::assignments::CreateAssignment {
            id: &Uuid::new_v4().to_string(),
            student_id: &student.id,
            course_id: &course.id,
            title: payload.title.trim(),
            description: &payload.description,
            content: &payload.content,
            file_path: payload.file_path.as_deref(),
            submitted_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to submit assignment"))?;

    tracing::info!(
        student_id = %student.id,
        course_id = %course.id,
        assignment_id = %assignment.id,
        action = "assignment_submit",
        "Assignment submitted"
    );

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from_db(assignment))))
}

pub(crate) async fn list_feedback(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackResponse>>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    require_course_manager(&state, &user, &course).await?;

    let feedback = repositories::feedback::list_for_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list feedback"))?;

    Ok(Json(feedback.into_iter().map(FeedbackResponse::from_db).collect()))
}

pub(crate) async fn submit_feedback(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<FeedbackCreate>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &course_id).await?;
    let student = require_student_profile(&state, &user).await?;
    require_enrollment(&state, &student, &course).await?;

    let feedback = repositories::feedback::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &student.id,
        &course.id,
        payload.feedback_text.trim(),
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to submit feedback"))?;

    Ok((StatusCode::CREATED, Json(FeedbackResponse::from_db(feedback))))
}

pub(crate) async fn get_progress(
    Path(course_id): Path<String>,
    Query(query): Query<StudentQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    let student =
        resolve_student_for_course(&state, &user, &course, query.student_id.as_deref()).await?;

    let report = grading::progress_report(state.db(), &student.id, &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute progress"))?;

    Ok(Json(ProgressResponse { student_id: student.id, course_id: course.id, report }))
}

pub(crate) async fn get_eligibility(
    Path(course_id): Path<String>,
    Query(query): Query<StudentQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    let student =
        resolve_student_for_course(&state, &user, &course, query.student_id.as_deref()).await?;

    let snapshot = grading::snapshot(state.db(), &student.id, &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to evaluate eligibility"))?;

    Ok(Json(EligibilityResponse {
        all_assignments_graded: snapshot.all_assignments_graded(),
        exam_taken_and_graded: snapshot.exam_taken_and_graded(),
        final_grade: snapshot.final_grade(),
        student_id: student.id,
        course_id: course.id,
    }))
}

pub(crate) async fn get_final_grade(
    Path(course_id): Path<String>,
    Query(query): Query<StudentQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<FinalGradeResponse>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    let student =
        resolve_student_for_course(&state, &user, &course, query.student_id.as_deref()).await?;

    let stored = repositories::final_grades::find(state.db(), &student.id, &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch final grade"))?
        .ok_or_else(|| ApiError::NotFound("Final grade has not been calculated".to_string()))?;
    let complete = grading::progress_report(state.db(), &student.id, &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute progress"))?
        .complete;

    Ok(Json(FinalGradeResponse::from_db(stored, complete)))
}

pub(crate) async fn persist_final_grade(
    Path(course_id): Path<String>,
    Query(query): Query<StudentQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<FinalGradeResponse>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    let student =
        resolve_student_for_course(&state, &user, &course, query.student_id.as_deref()).await?;

    let (stored, report) =
        grading::persist_final_grade(state.db(), &student.id, &course.id, primitive_now_utc())
            .await
            .map_err(|e| ApiError::from_write(e, "Failed to store final grade"))?;

    tracing::info!(
        actor_id = %user.id,
        student_id = %student.id,
        course_id = %course.id,
        final_grade = stored.final_grade,
        complete = report.complete,
        action = "final_grade_store",
        "Final grade stored"
    );

    Ok(Json(FinalGradeResponse::from_db(stored, report.complete)))
}

pub(crate) async fn issue_certificate(
    Path(course_id): Path<String>,
    Query(query): Query<StudentQuery>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<CertificateCreate>,
) -> Result<(StatusCode, Json<CertificateResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &course_id).await?;
    let student =
        resolve_student_for_course(&state, &user, &course, query.student_id.as_deref()).await?;
    require_enrollment(&state, &student, &course).await?;

    let report = grading::progress_report(state.db(), &student.id, &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute progress"))?;
    if !report.complete {
        return Err(ApiError::UnprocessableEntity(
            "All assignments and the exam must be graded before a certificate is issued"
                .to_string(),
        ));
    }

    let student_photo = payload
        .student_photo
        .or(student.certificate_photo)
        .or(student.profile_picture)
        .ok_or_else(|| {
            ApiError::UnprocessableEntity("A student photo is required for the certificate".to_string())
        })?;
    let company_logo = payload.company_logo.unwrap_or_else(|| DEFAULT_COMPANY_LOGO.to_string());
    let description = payload
        .description
        .unwrap_or_else(|| format!("Certificate of completion for {}", course.title));

    let certificate = repositories::certificates::create(
        state.db(),
        repositories::certificates::CreateCertificate {
            id: &Uuid::new_v4().to_string(),
            student_id: &student.id,
            course_id: &course.id,
            description: &description,
            student_photo: &student_photo,
            company_logo: &company_logo,
            issued_date: today_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to issue certificate"))?;

    tracing::info!(
        student_id = %student.id,
        course_id = %course.id,
        certificate_id = %certificate.id,
        final_grade = report.final_grade,
        action = "certificate_issue",
        "Certificate issued"
    );
    metrics::record_event("certificate_issued");

    Ok((StatusCode::CREATED, Json(CertificateResponse::from_db(certificate))))
}
