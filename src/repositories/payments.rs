use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Payment;

const COLUMNS: &str = "\
    id, user_id, course_id, amount_cents, reference_number, payment_date, is_approved, approved_at";

pub(crate) struct CreatePayment<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) amount_cents: i64,
    pub(crate) reference_number: &'a str,
    pub(crate) payment_date: PrimitiveDateTime,
}

/// Duplicate reference numbers trip `payments_reference_number_key`.
pub(crate) async fn create(pool: &PgPool, params: CreatePayment<'_>) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO payments (id, user_id, course_id, amount_cents, reference_number, payment_date)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.course_id)
    .bind(params.amount_cents)
    .bind(params.reference_number)
    .bind(params.payment_date)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!("SELECT {COLUMNS} FROM payments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn lock_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
) -> Result<Option<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payments WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn mark_approved<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    approved_at: PrimitiveDateTime,
) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        "UPDATE payments SET is_approved = TRUE, approved_at = $1 WHERE id = $2 RETURNING {COLUMNS}"
    ))
    .bind(approved_at)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payments WHERE user_id = $1 ORDER BY payment_date DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}
