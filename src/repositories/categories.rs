use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Category;

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    created_at: PrimitiveDateTime,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, created_at)
         VALUES ($1,$2,$3)
         RETURNING id, name, created_at",
    )
    .bind(id)
    .bind(name)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT id, name, created_at FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
}
