pub(crate) mod admin;
pub(crate) mod assignments;
pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod courses;
pub(crate) mod errors;
pub(crate) mod exams;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod instructors;
pub(crate) mod pagination;
pub(crate) mod payments;
pub(crate) mod quizzes;
pub(crate) mod router;
pub(crate) mod students;
pub(crate) mod users;
pub(crate) mod validation;
