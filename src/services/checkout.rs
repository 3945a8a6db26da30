use sqlx::PgPool;
use thiserror::Error;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Enrollment, Payment};
use crate::repositories;

#[derive(Debug, Error)]
pub(crate) enum CheckoutError {
    #[error("Payment not found")]
    PaymentNotFound,
    #[error("Payment is already approved")]
    AlreadyApproved,
    #[error("Paying user has no student profile")]
    NoStudentProfile,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub(crate) struct Approval {
    pub(crate) payment: Payment,
    pub(crate) enrollment: Enrollment,
    pub(crate) removed_from_cart: bool,
}

/// Approves a payment, enrolls the payer's student profile in the course and
/// drops the course from that student's cart. All or nothing.
pub(crate) async fn approve_payment(
    pool: &PgPool,
    payment_id: &str,
    now: PrimitiveDateTime,
) -> Result<Approval, CheckoutError> {
    let mut tx = pool.begin().await?;

    let payment = repositories::payments::lock_by_id(&mut *tx, payment_id)
        .await?
        .ok_or(CheckoutError::PaymentNotFound)?;
    if payment.is_approved {
        return Err(CheckoutError::AlreadyApproved);
    }

    let student = repositories::students::find_by_user_id(&mut *tx, &payment.user_id)
        .await?
        .ok_or(CheckoutError::NoStudentProfile)?;

    let payment = repositories::payments::mark_approved(&mut *tx, payment_id, now).await?;
    let enrollment = repositories::enrollments::enroll(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        &student.id,
        &payment.course_id,
        now,
    )
    .await?;
    let removed_from_cart =
        repositories::carts::remove(&mut *tx, &student.id, &payment.course_id).await?;

    tx.commit().await?;
    Ok(Approval { payment, enrollment, removed_from_cart })
}
