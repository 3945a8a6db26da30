use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Enrollment, Payment};

#[derive(Debug, Deserialize)]
pub(crate) struct CartItemCreate {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct PaymentCreate {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
    #[serde(alias = "amountCents")]
    #[validate(range(min = 0, message = "amount_cents must be non-negative"))]
    pub(crate) amount_cents: i64,
    #[serde(alias = "referenceNumber")]
    #[validate(length(min = 1, max = 100, message = "reference_number must be 1..100 characters"))]
    pub(crate) reference_number: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) amount_cents: i64,
    pub(crate) reference_number: String,
    pub(crate) payment_date: String,
    pub(crate) is_approved: bool,
    pub(crate) approved_at: Option<String>,
}

impl PaymentResponse {
    pub(crate) fn from_db(payment: Payment) -> Self {
        Self {
            id: payment.id,
            user_id: payment.user_id,
            course_id: payment.course_id,
            amount_cents: payment.amount_cents,
            reference_number: payment.reference_number,
            payment_date: format_primitive(payment.payment_date),
            is_approved: payment.is_approved,
            approved_at: payment.approved_at.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) enrolled_at: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            enrolled_at: format_primitive(enrollment.enrolled_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaymentApprovalResponse {
    pub(crate) payment: PaymentResponse,
    pub(crate) enrollment: EnrollmentResponse,
    pub(crate) removed_from_cart: bool,
}
