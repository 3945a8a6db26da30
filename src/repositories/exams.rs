use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Exam;
use crate::db::types::ExamStatus;

const COLUMNS: &str = "id, course_id, title, description, exam_date, status, created_at, updated_at";

pub(crate) struct CreateExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) exam_date: PrimitiveDateTime,
    pub(crate) created_at: PrimitiveDateTime,
}

/// A second exam for the same course trips `exams_course_id_key`.
pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (id, course_id, title, description, exam_date, status, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,'not_taken',$6,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.exam_date)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_course<'e>(
    executor: impl PgExecutor<'e>,
    course_id: &str,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE course_id = $1"))
        .bind(course_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn update_status(
    pool: &PgPool,
    id: &str,
    status: ExamStatus,
    updated_at: PrimitiveDateTime,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[derive(Debug, Default)]
pub(crate) struct ExamFilter {
    pub(crate) status: Option<ExamStatus>,
    pub(crate) course_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamListRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) status: ExamStatus,
    pub(crate) exam_date: PrimitiveDateTime,
}

pub(crate) async fn list_admin(
    pool: &PgPool,
    filter: &ExamFilter,
    skip: i64,
    limit: i64,
) -> Result<(Vec<ExamListRow>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exams e WHERE 1=1");
    push_filter(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT e.id, e.title, e.course_id, c.title AS course_title, e.status, e.exam_date
         FROM exams e
         JOIN courses c ON c.id = e.course_id
         WHERE 1=1",
    );
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY e.exam_date DESC OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    let rows = builder.build_query_as::<ExamListRow>().fetch_all(pool).await?;
    Ok((rows, total))
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ExamFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND e.status = ");
        builder.push_bind(status);
    }
    if let Some(course_id) = &filter.course_id {
        builder.push(" AND e.course_id = ");
        builder.push_bind(course_id.clone());
    }
}
