use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{load_course, CurrentAdmin, CurrentUser};
use crate::api::validation::validate_payload;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::commerce::{
    EnrollmentResponse, PaymentApprovalResponse, PaymentCreate, PaymentResponse,
};
use crate::services::checkout::{self, CheckoutError};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route("/:payment_id", get(get_payment))
        .route("/:payment_id/approve", post(approve_payment))
}

async fn list_payments(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = repositories::payments::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list payments"))?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from_db).collect()))
}

async fn create_payment(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<PaymentCreate>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    validate_payload(&payload)?;
    let course = load_course(&state, &payload.course_id).await?;

    let payment = repositories::payments::create(
        state.db(),
        repositories::payments::CreatePayment {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            course_id: &course.id,
            amount_cents: payload.amount_cents,
            reference_number: payload.reference_number.trim(),
            payment_date: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Failed to record payment"))?;

    tracing::info!(
        user_id = %user.id,
        payment_id = %payment.id,
        course_id = %course.id,
        amount_cents = payment.amount_cents,
        action = "payment_create",
        "Payment recorded"
    );

    Ok((StatusCode::CREATED, Json(PaymentResponse::from_db(payment))))
}

async fn get_payment(
    Path(payment_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = repositories::payments::find_by_id(state.db(), &payment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch payment"))?
        .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

    if payment.user_id != user.id && !user.is_admin() {
        return Err(ApiError::Forbidden("Not enough permissions for this payment"));
    }

    Ok(Json(PaymentResponse::from_db(payment)))
}

async fn approve_payment(
    Path(payment_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<PaymentApprovalResponse>, ApiError> {
    let approval = checkout::approve_payment(state.db(), &payment_id, primitive_now_utc())
        .await
        .map_err(|err| match err {
            CheckoutError::PaymentNotFound => ApiError::NotFound("Payment not found".to_string()),
            CheckoutError::AlreadyApproved => {
                ApiError::Conflict(CheckoutError::AlreadyApproved.to_string())
            }
            CheckoutError::NoStudentProfile => {
                ApiError::UnprocessableEntity(CheckoutError::NoStudentProfile.to_string())
            }
            CheckoutError::Database(e) => ApiError::from_write(e, "Failed to approve payment"),
        })?;

    tracing::info!(
        admin_id = %admin.id,
        payment_id = %approval.payment.id,
        enrollment_id = %approval.enrollment.id,
        action = "payment_approve",
        "Admin approved payment"
    );
    metrics::record_event("payment_approved");

    Ok(Json(PaymentApprovalResponse {
        payment: PaymentResponse::from_db(approval.payment),
        enrollment: EnrollmentResponse::from_db(approval.enrollment),
        removed_from_cart: approval.removed_from_cart,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn duplicate_reference_number_conflicts() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();
        let (course, _) = test_support::course_with_instructor(db, ctx.state.settings()).await;
        let buyer = test_support::insert_user(db, "frank", "frank-pass").await;
        let token = test_support::bearer_token(&buyer.id, ctx.state.settings());
        let payload = json!({
            "course_id": course.id,
            "amount_cents": 4999,
            "reference_number": "REF-0001"
        });

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/payments",
                Some(&token),
                Some(payload.clone()),
            ))
            .await
            .expect("first payment");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/payments",
                Some(&token),
                Some(payload),
            ))
            .await
            .expect("second payment");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = test_support::read_json(response).await;
        assert_eq!(body["detail"], "reference_number already exists");
    }

    #[tokio::test]
    async fn approval_enrolls_student_and_clears_cart() {
        let ctx = test_support::setup_test_context().await;
        let db = ctx.state.db();
        let settings = ctx.state.settings();
        let (course, _) = test_support::course_with_instructor(db, settings).await;
        let buyer = test_support::insert_user(db, "grace", "grace-pass").await;
        let student = test_support::insert_student(db, &buyer).await;
        let buyer_token = test_support::bearer_token(&buyer.id, settings);
        let admin = test_support::insert_admin(db, "root", "root-pass").await;
        let admin_token = test_support::bearer_token(&admin.id, settings);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/students/{}/cart", student.id),
                Some(&buyer_token),
                Some(json!({ "course_id": course.id })),
            ))
            .await
            .expect("add to cart");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/payments",
                Some(&buyer_token),
                Some(json!({
                    "course_id": course.id,
                    "amount_cents": 4999,
                    "reference_number": "REF-0002"
                })),
            ))
            .await
            .expect("create payment");
        let payment = test_support::read_json(response).await;
        let payment_id = payment["id"].as_str().expect("payment id").to_string();

        let approve_uri = format!("/api/v1/payments/{payment_id}/approve");
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::POST, &approve_uri, Some(&buyer_token), None))
            .await
            .expect("approve as buyer");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::POST, &approve_uri, Some(&admin_token), None))
            .await
            .expect("approve as admin");
        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::read_json(response).await;
        assert_eq!(body["payment"]["is_approved"], true);
        assert_eq!(body["enrollment"]["student_id"], student.id.as_str());
        assert_eq!(body["removed_from_cart"], true);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::POST, &approve_uri, Some(&admin_token), None))
            .await
            .expect("approve twice");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
