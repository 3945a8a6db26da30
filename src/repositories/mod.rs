pub(crate) mod assignments;
pub(crate) mod carts;
pub(crate) mod categories;
pub(crate) mod certificates;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod exams;
pub(crate) mod feedback;
pub(crate) mod final_grades;
pub(crate) mod instructors;
pub(crate) mod lessons;
pub(crate) mod payments;
pub(crate) mod quizzes;
pub(crate) mod students;
pub(crate) mod users;
