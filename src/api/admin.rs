use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{normalize, PaginatedResponse};
use crate::core::state::AppState;
use crate::db::types::{AssignmentStatus, ExamStatus};
use crate::repositories;
use crate::schemas::admin::{
    parse_issued_date, AdminAssignmentItem, AdminCertificateItem, AdminEntity, AdminExamItem,
    AdminListQuery, AdminStudentItem,
};
use crate::schemas::user::UserResponse;

/// Static admin configuration; entries are never registered at runtime.
pub(crate) static REGISTRY: [AdminEntity; 5] = [
    AdminEntity {
        entity: "assignment",
        list_display: &["title", "student", "course", "status", "grade"],
        list_filter: &["status", "course"],
        search_fields: &[],
        ordering: &[],
    },
    AdminEntity {
        entity: "exam",
        list_display: &["title", "course", "status", "exam_date"],
        list_filter: &["status", "course"],
        search_fields: &[],
        ordering: &[],
    },
    AdminEntity {
        entity: "user",
        list_display: &["username", "email", "phone_number", "is_verified", "is_staff", "is_superuser"],
        list_filter: &[],
        search_fields: &["username", "email", "phone_number"],
        ordering: &["username"],
    },
    AdminEntity {
        entity: "certificate",
        list_display: &["student", "course", "issued_date"],
        list_filter: &["issued_date"],
        search_fields: &["student__user__username", "course__title"],
        ordering: &[],
    },
    AdminEntity {
        entity: "student",
        list_display: &["user"],
        list_filter: &[],
        search_fields: &[],
        ordering: &[],
    },
];

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/registry", get(registry))
        .route("/users", get(list_users))
        .route("/students", get(list_students))
        .route("/assignments", get(list_assignments))
        .route("/exams", get(list_exams))
        .route("/certificates", get(list_certificates))
}

async fn registry(CurrentAdmin(_admin): CurrentAdmin) -> Json<&'static [AdminEntity]> {
    Json(&REGISTRY)
}

fn parse_status<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> Result<Option<T>, ApiError> {
    raw.map(|value| {
        serde_json::from_value(serde_json::Value::String(value.to_string()))
            .map_err(|_| ApiError::BadRequest(format!("Unknown status '{value}'")))
    })
    .transpose()
}

async fn list_users(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    let (skip, limit) = normalize(params.skip, params.limit);
    let (users, total_count) =
        repositories::users::search(state.db(), params.search.as_deref(), skip, limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    Ok(Json(PaginatedResponse {
        items: users.into_iter().map(UserResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn list_students(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<PaginatedResponse<AdminStudentItem>>, ApiError> {
    let (skip, limit) = normalize(params.skip, params.limit);
    let (rows, total_count) = repositories::students::list_with_users(state.db(), skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    Ok(Json(PaginatedResponse {
        items: rows.into_iter().map(AdminStudentItem::from_row).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn list_assignments(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<PaginatedResponse<AdminAssignmentItem>>, ApiError> {
    let (skip, limit) = normalize(params.skip, params.limit);
    let filter = repositories::assignments::AssignmentFilter {
        status: parse_status::<AssignmentStatus>(params.status.as_deref())?,
        course_id: params.course_id,
    };
    let (rows, total_count) = repositories::assignments::list_admin(state.db(), &filter, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(PaginatedResponse {
        items: rows.into_iter().map(AdminAssignmentItem::from_row).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn list_exams(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<PaginatedResponse<AdminExamItem>>, ApiError> {
    let (skip, limit) = normalize(params.skip, params.limit);
    let filter = repositories::exams::ExamFilter {
        status: parse_status::<ExamStatus>(params.status.as_deref())?,
        course_id: params.course_id,
    };
    let (rows, total_count) = repositories::exams::list_admin(state.db(), &filter, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    Ok(Json(PaginatedResponse {
        items: rows.into_iter().map(AdminExamItem::from_row).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn list_certificates(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminListQuery>,
) -> Result<Json<PaginatedResponse<AdminCertificateItem>>, ApiError> {
    let (skip, limit) = normalize(params.skip, params.limit);
    let issued_date = match params.issued_date.as_deref() {
        Some(raw) => Some(parse_issued_date(raw).ok_or_else(|| {
            ApiError::BadRequest("issued_date must be formatted as YYYY-MM-DD".to_string())
        })?),
        None => None,
    };
    let filter = repositories::certificates::CertificateFilter { issued_date, search: params.search };
    let (rows, total_count) =
        repositories::certificates::list_admin(state.db(), &filter, skip, limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list certificates"))?;

    Ok(Json(PaginatedResponse {
        items: rows.into_iter().map(AdminCertificateItem::from_row).collect(),
        total_count,
        skip,
        limit,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use super::{parse_status, REGISTRY};
    use crate::db::types::ExamStatus;
    use crate::test_support;

    #[test]
    fn registry_lists_each_entity_once() {
        let names: Vec<_> = REGISTRY.iter().map(|entry| entry.entity).collect();
        assert_eq!(names, ["assignment", "exam", "user", "certificate", "student"]);

        let user = REGISTRY.iter().find(|entry| entry.entity == "user").unwrap();
        assert_eq!(user.ordering, ["username"]);
        assert_eq!(user.search_fields, ["username", "email", "phone_number"]);
    }

    #[test]
    fn status_filter_rejects_unknown_values() {
        assert_eq!(parse_status::<ExamStatus>(Some("taken")).unwrap(), Some(ExamStatus::Taken));
        assert_eq!(parse_status::<ExamStatus>(None).unwrap(), None);
        assert!(parse_status::<ExamStatus>(Some("lost")).is_err());
    }

    #[tokio::test]
    async fn admin_lists_require_staff() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();
        let settings = ctx.state.settings();
        let user = test_support::insert_user(db, "henry", "henry-pass").await;
        let admin = test_support::insert_admin(db, "staff", "staff-pass").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/admin/users?search=henr",
                Some(&test_support::bearer_token(&user.id, settings)),
                None,
            ))
            .await
            .expect("non-admin request");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/admin/users?search=henr",
                Some(&test_support::bearer_token(&admin.id, settings)),
                None,
            ))
            .await
            .expect("admin request");
        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::read_json(response).await;
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["items"][0]["username"], "henry");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/admin/exams?status=lost",
                Some(&test_support::bearer_token(&admin.id, settings)),
                None,
            ))
            .await
            .expect("bad status filter");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
