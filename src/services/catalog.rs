use sqlx::PgPool;
use thiserror::Error;

use crate::db;
use crate::db::models::Lesson;
use crate::repositories;
use crate::repositories::lessons::CreateLesson;

/// Upper bound on lessons attached to a single course.
pub(crate) const MAX_LESSONS_PER_COURSE: i64 = 1;

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("A course can have at most one lesson")]
    LessonLimitReached,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Creates the course's lesson. The course row stays locked while the
/// existing lessons are counted so concurrent creates serialize.
pub(crate) async fn add_lesson(
    pool: &PgPool,
    params: CreateLesson<'_>,
) -> Result<Lesson, CatalogError> {
    let mut tx = pool.begin().await?;

    if repositories::courses::lock_for_update(&mut *tx, params.course_id).await?.is_none() {
        return Err(CatalogError::CourseNotFound);
    }

    let existing = repositories::lessons::count_for_course(&mut *tx, params.course_id).await?;
    if existing >= MAX_LESSONS_PER_COURSE {
        return Err(CatalogError::LessonLimitReached);
    }

    let lesson = repositories::lessons::create(&mut *tx, params).await.map_err(|err| {
        if db::unique_violation(&err).is_some() {
            CatalogError::LessonLimitReached
        } else {
            CatalogError::Database(err)
        }
    })?;

    tx.commit().await?;
    Ok(lesson)
}
