mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_courses).post(handlers::create_course))
        .route(
            "/:course_id",
            get(handlers::get_course).patch(handlers::update_course).delete(handlers::delete_course),
        )
        .route("/:course_id/lesson", get(handlers::get_lesson).post(handlers::create_lesson))
        .route("/:course_id/quiz", get(handlers::get_quiz).post(handlers::create_quiz))
        .route("/:course_id/quiz/questions", post(handlers::add_question))
        .route("/:course_id/exam", get(handlers::get_exam).post(handlers::create_exam))
        .route(
            "/:course_id/assignments",
            get(handlers::list_assignments).post(handlers::submit_assignment),
        )
        .route("/:course_id/feedback", get(handlers::list_feedback).post(handlers::submit_feedback))
        .route("/:course_id/progress", get(handlers::get_progress))
        .route("/:course_id/eligibility", get(handlers::get_eligibility))
        .route(
            "/:course_id/final-grade",
            get(handlers::get_final_grade).post(handlers::persist_final_grade),
        )
        .route("/:course_id/certificate", post(handlers::issue_certificate))
}

#[cfg(test)]
mod tests;
