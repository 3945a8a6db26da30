mod catalog;
mod completion;
mod content;

pub(super) use catalog::{create_course, delete_course, get_course, list_courses, update_course};
pub(super) use completion::{
    get_eligibility, get_final_grade, get_progress, issue_certificate, list_assignments,
    list_feedback, persist_final_grade, submit_assignment, submit_feedback,
};
pub(super) use content::{
    add_question, create_exam, create_lesson, create_quiz, get_exam, get_lesson, get_quiz,
};
