use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Enrollment;

const COLUMNS: &str = "id, student_id, course_id, enrolled_at";

/// Enrolls the student, returning the existing row when already enrolled.
pub(crate) async fn enroll<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    student_id: &str,
    course_id: &str,
    enrolled_at: PrimitiveDateTime,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, student_id, course_id, enrolled_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (student_id, course_id)
         DO UPDATE SET student_id = EXCLUDED.student_id
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(student_id)
    .bind(course_id)
    .bind(enrolled_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 ORDER BY enrolled_at"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn exists(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
    )
    .bind(student_id)
    .bind(course_id)
    .fetch_one(pool)
    .await
}
