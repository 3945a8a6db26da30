use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::{Question, Quiz, QuizResult};
use crate::db::types::ChoiceLetter;

const QUIZ_COLUMNS: &str = "id, lesson_id, created_at";
const QUESTION_COLUMNS: &str = "\
    id, quiz_id, text, choice_a, choice_b, choice_c, choice_d, correct_choice, order_index, \
    created_at";
const RESULT_COLUMNS: &str = "id, student_id, quiz_id, score, recorded_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    lesson_id: &str,
    created_at: PrimitiveDateTime,
) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (id, lesson_id, created_at) VALUES ($1,$2,$3) RETURNING {QUIZ_COLUMNS}"
    ))
    .bind(id)
    .bind(lesson_id)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

/// The quiz reachable from a course through its lesson.
pub(crate) async fn find_for_course<'e>(
    executor: impl PgExecutor<'e>,
    course_id: &str,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(
        "SELECT q.id, q.lesson_id, q.created_at
         FROM quizzes q
         JOIN lessons l ON l.id = q.lesson_id
         WHERE l.course_id = $1",
    )
    .bind(course_id)
    .fetch_optional(executor)
    .await
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) text: &'a str,
    pub(crate) choices: [&'a str; 4],
    pub(crate) correct_choice: ChoiceLetter,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

pub(crate) async fn create_question(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    let [choice_a, choice_b, choice_c, choice_d] = params.choices;
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, quiz_id, text, choice_a, choice_b, choice_c, choice_d, correct_choice,
            order_index, created_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
         RETURNING {QUESTION_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.text)
    .bind(choice_a)
    .bind(choice_b)
    .bind(choice_c)
    .bind(choice_d)
    .bind(params.correct_choice)
    .bind(params.order_index)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_questions(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS}
         FROM questions
         WHERE quiz_id = $1
         ORDER BY order_index, created_at"
    ))
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn upsert_result<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    student_id: &str,
    quiz_id: &str,
    score: i32,
    recorded_at: PrimitiveDateTime,
) -> Result<QuizResult, sqlx::Error> {
    sqlx::query_as::<_, QuizResult>(&format!(
        "INSERT INTO quiz_results (id, student_id, quiz_id, score, recorded_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (student_id, quiz_id)
         DO UPDATE SET score = EXCLUDED.score, recorded_at = EXCLUDED.recorded_at
         RETURNING {RESULT_COLUMNS}",
    ))
    .bind(id)
    .bind(student_id)
    .bind(quiz_id)
    .bind(score)
    .bind(recorded_at)
    .fetch_one(executor)
    .await
}

/// Inserts a result only when the student has none for this quiz yet.
pub(crate) async fn insert_first_result<'e>(
    executor: impl PgExecutor<'e>,
    id: &str,
    student_id: &str,
    quiz_id: &str,
    score: i32,
    recorded_at: PrimitiveDateTime,
) -> Result<Option<QuizResult>, sqlx::Error> {
    sqlx::query_as::<_, QuizResult>(&format!(
        "INSERT INTO quiz_results (id, student_id, quiz_id, score, recorded_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (student_id, quiz_id) DO NOTHING
         RETURNING {RESULT_COLUMNS}",
    ))
    .bind(id)
    .bind(student_id)
    .bind(quiz_id)
    .bind(score)
    .bind(recorded_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn course_id_for(pool: &PgPool, quiz_id: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT l.course_id
         FROM quizzes q
         JOIN lessons l ON l.id = q.lesson_id
         WHERE q.id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await
}
