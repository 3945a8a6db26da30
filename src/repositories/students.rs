use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::{GradeMap, Student};

const COLUMNS: &str = "\
    id, user_id, profile_picture, track_record, feedback, grades, certificate_photo, \
    created_at, updated_at";

pub(crate) struct CreateStudent<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) profile_picture: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (id, user_id, profile_picture, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.profile_picture)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn find_by_user_id<'e>(
    executor: impl PgExecutor<'e>,
    user_id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) struct UpdateStudent {
    pub(crate) profile_picture: Option<String>,
    pub(crate) track_record: Option<String>,
    pub(crate) feedback: Option<String>,
    pub(crate) certificate_photo: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateStudent,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE students SET
            profile_picture = COALESCE($1, profile_picture),
            track_record = COALESCE($2, track_record),
            feedback = COALESCE($3, feedback),
            certificate_photo = COALESCE($4, certificate_photo),
            updated_at = $5
         WHERE id = $6",
    )
    .bind(params.profile_picture)
    .bind(params.track_record)
    .bind(params.feedback)
    .bind(params.certificate_photo)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn fetch_grades<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
) -> Result<Option<GradeMap>, sqlx::Error> {
    let grades = sqlx::query_scalar::<_, sqlx::types::Json<GradeMap>>(
        "SELECT grades FROM students WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(grades.map(|json| json.0))
}

/// Writes one entry of the grade mapping, replacing any previous score under `key`.
pub(crate) async fn set_grade<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    key: &str,
    score: f64,
    updated_at: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE students
         SET grades = grades || jsonb_build_object($1::text, $2::double precision),
             updated_at = $3
         WHERE id = $4",
    )
    .bind(key)
    .bind(score)
    .bind(updated_at)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StudentListRow {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) username: String,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn list_with_users(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<(Vec<StudentListRow>, i64), sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students").fetch_one(pool).await?;

    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT s.id, s.user_id, u.username, s.created_at
         FROM students s
         JOIN users u ON u.id = s.user_id
         ORDER BY s.created_at DESC OFFSET ",
    );
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    let rows = builder.build_query_as::<StudentListRow>().fetch_all(pool).await?;
    Ok((rows, total))
}
