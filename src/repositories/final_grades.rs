use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::FinalGrade;

const COLUMNS: &str = "id, student_id, course_id, final_grade, calculated_at";

pub(crate) async fn upsert<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    student_id: &str,
    course_id: &str,
    final_grade: f64,
    calculated_at: PrimitiveDateTime,
) -> Result<FinalGrade, sqlx::Error> {
    sqlx::query_as::<_, FinalGrade>(&format!(
        "INSERT INTO final_grades (id, student_id, course_id, final_grade, calculated_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (student_id, course_id)
         DO UPDATE SET final_grade = EXCLUDED.final_grade, calculated_at = EXCLUDED.calculated_at
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(student_id)
    .bind(course_id)
    .bind(final_grade)
    .bind(calculated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<Option<FinalGrade>, sqlx::Error> {
    sqlx::query_as::<_, FinalGrade>(&format!(
        "SELECT {COLUMNS} FROM final_grades WHERE student_id = $1 AND course_id = $2"
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}
