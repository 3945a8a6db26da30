use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Assignment;
use crate::db::types::AssignmentStatus;

const COLUMNS: &str = "\
    id, student_id, course_id, title, description, content, file_path, status, grade, \
    submitted_at, updated_at";

pub(crate) struct CreateAssignment<'a> {
    pub(crate) id: &'a str,
    pub(crate) student_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) content: &'a str,
    pub(crate) file_path: Option<&'a str>,
    pub(crate) submitted_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAssignment<'_>,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "INSERT INTO assignments (
            id, student_id, course_id, title, description, content, file_path, status,
            submitted_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,'submitted',$8,$8)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.content)
    .bind(params.file_path)
    .bind(params.submitted_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!("SELECT {COLUMNS} FROM assignments WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_student_course<'e>(
    executor: impl PgExecutor<'e>,
    student_id: &str,
    course_id: &str,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {COLUMNS}
         FROM assignments
         WHERE student_id = $1 AND course_id = $2
         ORDER BY submitted_at"
    ))
    .bind(student_id)
    .bind(course_id)
    .fetch_all(executor)
    .await
}

pub(crate) struct UpdateAssignment {
    pub(crate) status: Option<AssignmentStatus>,
    pub(crate) grade: Option<f64>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateAssignment,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "UPDATE assignments SET
            status = COALESCE($1, status),
            grade = COALESCE($2, grade),
            updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(params.status)
    .bind(params.grade)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[derive(Debug, Default)]
pub(crate) struct AssignmentFilter {
    pub(crate) status: Option<AssignmentStatus>,
    pub(crate) course_id: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AssignmentListRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) student_id: String,
    pub(crate) student_username: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) status: AssignmentStatus,
    pub(crate) grade: Option<f64>,
}

/// Admin listing joined with the student's username and the course title.
pub(crate) async fn list_admin(
    pool: &PgPool,
    filter: &AssignmentFilter,
    skip: i64,
    limit: i64,
) -> Result<(Vec<AssignmentListRow>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM assignments a WHERE 1=1");
    push_filter(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT a.id, a.title, a.student_id, u.username AS student_username,
                a.course_id, c.title AS course_title, a.status, a.grade
         FROM assignments a
         JOIN students s ON s.id = a.student_id
         JOIN users u ON u.id = s.user_id
         JOIN courses c ON c.id = a.course_id
         WHERE 1=1",
    );
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY a.submitted_at DESC OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    let rows = builder.build_query_as::<AssignmentListRow>().fetch_all(pool).await?;
    Ok((rows, total))
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AssignmentFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND a.status = ");
        builder.push_bind(status);
    }
    if let Some(course_id) = &filter.course_id {
        builder.push(" AND a.course_id = ");
        builder.push_bind(course_id.clone());
    }
}
