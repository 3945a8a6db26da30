use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Feedback;

const COLUMNS: &str = "id, student_id, course_id, feedback_text, submitted_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    student_id: &str,
    course_id: &str,
    feedback_text: &str,
    submitted_at: PrimitiveDateTime,
) -> Result<Feedback, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(&format!(
        "INSERT INTO feedback (id, student_id, course_id, feedback_text, submitted_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(student_id)
    .bind(course_id)
    .bind(feedback_text)
    .bind(submitted_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(&format!(
        "SELECT {COLUMNS} FROM feedback WHERE course_id = $1 ORDER BY submitted_at DESC"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}
