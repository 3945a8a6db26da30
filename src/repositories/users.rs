use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::User;

const COLUMNS: &str = "\
    id, username, email, phone_number, hashed_password, first_name, last_name, \
    is_verified, is_active, is_staff, is_superuser, last_login, date_joined, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn fetch_one_by_id(pool: &PgPool, id: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) username: &'a str,
    pub(crate) email: &'a str,
    pub(crate) phone_number: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) first_name: &'a str,
    pub(crate) last_name: &'a str,
    pub(crate) is_verified: bool,
    pub(crate) is_active: bool,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
    pub(crate) date_joined: PrimitiveDateTime,
}

/// Inserts a user. Duplicate username, email or phone number surface as a
/// unique violation on `users_*_key`.
pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, username, email, phone_number, hashed_password, first_name, last_name,
            is_verified, is_active, is_staff, is_superuser, date_joined, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$12)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.username)
    .bind(params.email)
    .bind(params.phone_number)
    .bind(params.hashed_password)
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.is_verified)
    .bind(params.is_active)
    .bind(params.is_staff)
    .bind(params.is_superuser)
    .bind(params.date_joined)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateUser {
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phone_number: Option<String>,
    pub(crate) is_verified: Option<bool>,
    pub(crate) is_active: Option<bool>,
    pub(crate) is_staff: Option<bool>,
    pub(crate) is_superuser: Option<bool>,
    pub(crate) hashed_password: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateUser) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE users SET
            first_name = COALESCE($1, first_name),
            last_name = COALESCE($2, last_name),
            email = COALESCE($3, email),
            phone_number = COALESCE($4, phone_number),
            is_verified = COALESCE($5, is_verified),
            is_active = COALESCE($6, is_active),
            is_staff = COALESCE($7, is_staff),
            is_superuser = COALESCE($8, is_superuser),
            hashed_password = COALESCE($9, hashed_password),
            updated_at = $10
         WHERE id = $11",
    )
    .bind(params.first_name)
    .bind(params.last_name)
    .bind(params.email)
    .bind(params.phone_number)
    .bind(params.is_verified)
    .bind(params.is_active)
    .bind(params.is_staff)
    .bind(params.is_superuser)
    .bind(params.hashed_password)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn touch_last_login(
    pool: &PgPool,
    id: &str,
    at: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes the user and, by cascade, every profile, payment and record it owns.
pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Admin listing: case-insensitive search over username, email and phone, ordered by username.
pub(crate) async fn search(
    pool: &PgPool,
    search: Option<&str>,
    skip: i64,
    limit: i64,
) -> Result<(Vec<User>, i64), sqlx::Error> {
    let pattern = search.map(|term| format!("%{}%", term.trim()));

    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
    push_search(&mut count, pattern.as_deref());
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM users"));
    push_search(&mut builder, pattern.as_deref());
    builder.push(" ORDER BY username OFFSET ");
    builder.push_bind(skip);
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    let users = builder.build_query_as::<User>().fetch_all(pool).await?;
    Ok((users, total))
}

fn push_search(builder: &mut QueryBuilder<'_, Postgres>, pattern: Option<&str>) {
    let Some(pattern) = pattern else {
        return;
    };

    builder.push(" WHERE username ILIKE ");
    builder.push_bind(pattern.to_string());
    builder.push(" OR email ILIKE ");
    builder.push_bind(pattern.to_string());
    builder.push(" OR phone_number ILIKE ");
    builder.push_bind(pattern.to_string());
}
