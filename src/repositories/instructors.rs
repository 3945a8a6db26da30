use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Instructor;

const COLUMNS: &str = "id, user_id, profile_picture, verification_code, created_at";

pub(crate) struct CreateInstructor<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) profile_picture: Option<&'a str>,
    pub(crate) verification_code: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateInstructor<'_>,
) -> Result<Instructor, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "INSERT INTO instructors (id, user_id, profile_picture, verification_code, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.profile_picture)
    .bind(params.verification_code)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!("SELECT {COLUMNS} FROM instructors WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "SELECT {COLUMNS} FROM instructors WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
