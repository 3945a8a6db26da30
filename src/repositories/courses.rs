use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Course;

const COURSE_COLUMNS: &str = "\
    id, category_id, instructor_id, title, slug, description, price_cents, \
    is_approved, is_published, created_at, updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) category_id: &'a str,
    pub(crate) instructor_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) slug: &'a str,
    pub(crate) description: &'a str,
    pub(crate) price_cents: i64,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) struct UpdateCourse {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) price_cents: Option<i64>,
    pub(crate) is_approved: Option<bool>,
    pub(crate) is_published: Option<bool>,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Default)]
pub(crate) struct CourseFilter {
    pub(crate) category_id: Option<String>,
    pub(crate) instructor_id: Option<String>,
    pub(crate) published_only: bool,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, category_id, instructor_id, title, slug, description, price_cents,
            is_approved, is_published, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,FALSE,FALSE,$8,$8)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.category_id)
    .bind(params.instructor_id)
    .bind(params.title)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.price_cents)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, course_id: &str) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &CourseFilter,
    skip: i64,
    limit: i64,
) -> Result<(Vec<Course>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses WHERE TRUE");
    push_filter(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COURSE_COLUMNS} FROM courses WHERE TRUE"));
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY created_at DESC OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    let courses = builder.build_query_as::<Course>().fetch_all(pool).await?;
    Ok((courses, total))
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &CourseFilter) {
    if filter.published_only {
        builder.push(" AND is_published AND is_approved");
    }
    if let Some(category_id) = filter.category_id.as_ref() {
        builder.push(" AND category_id = ");
        builder.push_bind(category_id.clone());
    }
    if let Some(instructor_id) = filter.instructor_id.as_ref() {
        builder.push(" AND instructor_id = ");
        builder.push_bind(instructor_id.clone());
    }
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    params: UpdateCourse,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE courses SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            price_cents = COALESCE($3, price_cents),
            is_approved = COALESCE($4, is_approved),
            is_published = COALESCE($5, is_published),
            updated_at = $6
         WHERE id = $7",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.price_cents)
    .bind(params.is_approved)
    .bind(params.is_published)
    .bind(params.updated_at)
    .bind(course_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes the course together with its lesson, quiz, exam, assignments and payments.
pub(crate) async fn delete(pool: &PgPool, course_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1").bind(course_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Locks the course row for the rest of the transaction. `None` when it does not exist.
pub(crate) async fn lock_for_update<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    course_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM courses WHERE id = $1 FOR UPDATE")
        .bind(course_id)
        .fetch_optional(executor)
        .await
}
