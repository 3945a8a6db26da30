use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Course;

/// Adding a course already in the cart is a no-op.
pub(crate) async fn add(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
    added_at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO cart_items (student_id, course_id, added_at)
         VALUES ($1,$2,$3)
         ON CONFLICT (student_id, course_id) DO NOTHING",
    )
    .bind(student_id)
    .bind(course_id)
    .bind(added_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn remove<'e>(
    executor: impl PgExecutor<'e>,
    student_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE student_id = $1 AND course_id = $2")
        .bind(student_id)
        .bind(course_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_courses(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.category_id, c.instructor_id, c.title, c.slug, c.description,
                c.price_cents, c.is_approved, c.is_published, c.created_at, c.updated_at
         FROM cart_items ci
         JOIN courses c ON c.id = ci.course_id
         WHERE ci.student_id = $1
         ORDER BY ci.added_at",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}
