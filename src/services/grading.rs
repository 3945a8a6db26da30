//! Course grading and completion eligibility.
//!
//! A student's final grade in a course blends three components:
//! `0.5 * assignments + 0.25 * quiz + 0.25 * exam`. Missing data counts as
//! zero; [`ProgressReport::complete`] tells callers whether every input was
//! actually graded.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Assignment, Exam, FinalGrade, GradeMap, Question, Quiz, QuizResult};
use crate::db::types::{AssignmentStatus, ChoiceLetter, ExamStatus};
use crate::repositories;

const ASSIGNMENT_WEIGHT: f64 = 0.5;
const QUIZ_WEIGHT: f64 = 0.25;
const EXAM_WEIGHT: f64 = 0.25;

const MAX_SCORE: f64 = 100.0;

// Far above the representation error of a percentage scaled by 100, far below
// one hundredth of a point.
const HALF_EPSILON: f64 = 1e-9;

pub(crate) fn quiz_key(quiz_id: &str) -> String {
    format!("quiz_{quiz_id}")
}

pub(crate) fn exam_key(exam_id: &str) -> String {
    format!("exam_{exam_id}")
}

/// Rounds half away from zero to two decimal places, treating values such as
/// `1.005` (stored as `1.00499..`) as the decimal they were written as.
pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    let whole = scaled.trunc();
    let fraction = (scaled - whole).abs();
    let hundredths = if fraction + HALF_EPSILON >= 0.5 { whole + scaled.signum() } else { whole };
    hundredths / 100.0
}

/// Vacuously true when there are no assignments.
pub(crate) fn all_graded(assignments: &[Assignment]) -> bool {
    assignments.iter().all(|assignment| assignment.status == AssignmentStatus::Graded)
}

/// Sum of recorded grades over the number of assignments. Ungraded ones count
/// in the divisor.
pub(crate) fn assignment_average(assignments: &[Assignment]) -> f64 {
    if assignments.is_empty() {
        return 0.0;
    }
    let total: f64 = assignments.iter().filter_map(|assignment| assignment.grade).sum();
    total / assignments.len() as f64
}

pub(crate) fn weighted_grade(assignment_average: f64, quiz_score: f64, exam_score: f64) -> f64 {
    round_to_hundredths(
        ASSIGNMENT_WEIGHT * assignment_average + QUIZ_WEIGHT * quiz_score + EXAM_WEIGHT * exam_score,
    )
}

/// Percentage of questions answered correctly, rounded to a whole number.
/// Unanswered questions count as wrong; a quiz without questions scores 0.
pub(crate) fn score_attempt(questions: &[Question], answers: &HashMap<String, ChoiceLetter>) -> i32 {
    if questions.is_empty() {
        return 0;
    }
    let correct = questions
        .iter()
        .filter(|question| answers.get(&question.id) == Some(&question.correct_choice))
        .count();
    (correct as f64 * MAX_SCORE / questions.len() as f64).round() as i32
}

/// Everything grading needs for one (student, course) pair, read together.
#[derive(Debug, Default)]
pub(crate) struct CourseSnapshot {
    pub(crate) assignments: Vec<Assignment>,
    pub(crate) grades: GradeMap,
    pub(crate) quiz: Option<Quiz>,
    pub(crate) exam: Option<Exam>,
}

impl CourseSnapshot {
    pub(crate) fn all_assignments_graded(&self) -> bool {
        all_graded(&self.assignments)
    }

    /// Exam status is recorded per course, not per student.
    pub(crate) fn exam_taken_and_graded(&self) -> bool {
        self.exam.as_ref().is_some_and(|exam| exam.status == ExamStatus::Graded)
    }

    pub(crate) fn quiz_score(&self) -> f64 {
        self.quiz
            .as_ref()
            .and_then(|quiz| self.grades.get(&quiz_key(&quiz.id)))
            .copied()
            .unwrap_or(0.0)
    }

    pub(crate) fn exam_score(&self) -> f64 {
        self.exam
            .as_ref()
            .and_then(|exam| self.grades.get(&exam_key(&exam.id)))
            .copied()
            .unwrap_or(0.0)
    }

    pub(crate) fn final_grade(&self) -> f64 {
        weighted_grade(assignment_average(&self.assignments), self.quiz_score(), self.exam_score())
    }

    pub(crate) fn report(&self) -> ProgressReport {
        let all_assignments_graded = self.all_assignments_graded();
        let exam_taken_and_graded = self.exam_taken_and_graded();
        ProgressReport {
            assignment_count: self.assignments.len(),
            assignment_average: round_to_hundredths(assignment_average(&self.assignments)),
            quiz_score: self.quiz_score(),
            exam_score: self.exam_score(),
            final_grade: self.final_grade(),
            all_assignments_graded,
            exam_taken_and_graded,
            complete: all_assignments_graded && exam_taken_and_graded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ProgressReport {
    pub(crate) assignment_count: usize,
    pub(crate) assignment_average: f64,
    pub(crate) quiz_score: f64,
    pub(crate) exam_score: f64,
    pub(crate) final_grade: f64,
    pub(crate) all_assignments_graded: bool,
    pub(crate) exam_taken_and_graded: bool,
    pub(crate) complete: bool,
}

async fn load_snapshot(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    student_id: &str,
    course_id: &str,
) -> Result<CourseSnapshot, sqlx::Error> {
    let assignments =
        repositories::assignments::list_for_student_course(&mut **tx, student_id, course_id)
            .await?;
    let grades = repositories::students::fetch_grades(&mut **tx, student_id).await?;
    let quiz = repositories::quizzes::find_for_course(&mut **tx, course_id).await?;
    let exam = repositories::exams::find_by_course(&mut **tx, course_id).await?;

    Ok(CourseSnapshot { assignments, grades: grades.unwrap_or_default(), quiz, exam })
}

/// Reads every grading input inside a single transaction.
pub(crate) async fn snapshot(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<CourseSnapshot, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let snapshot = load_snapshot(&mut tx, student_id, course_id).await?;
    tx.commit().await?;
    Ok(snapshot)
}

pub(crate) async fn progress_report(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
) -> Result<ProgressReport, sqlx::Error> {
    Ok(snapshot(pool, student_id, course_id).await?.report())
}

/// Computes and stores the final grade in the same transaction as the reads.
pub(crate) async fn persist_final_grade(
    pool: &PgPool,
    student_id: &str,
    course_id: &str,
    now: PrimitiveDateTime,
) -> Result<(FinalGrade, ProgressReport), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let report = load_snapshot(&mut tx, student_id, course_id).await?.report();
    let stored = repositories::final_grades::upsert(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        student_id,
        course_id,
        report.final_grade,
        now,
    )
    .await?;
    tx.commit().await?;
    Ok((stored, report))
}

/// Stores a quiz result and mirrors it into the student's grade mapping.
pub(crate) async fn record_quiz_result(
    pool: &PgPool,
    student_id: &str,
    quiz_id: &str,
    score: i32,
    now: PrimitiveDateTime,
) -> Result<QuizResult, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = repositories::quizzes::upsert_result(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        student_id,
        quiz_id,
        score,
        now,
    )
    .await?;
    repositories::students::set_grade(&mut *tx, student_id, &quiz_key(quiz_id), score as f64, now)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// Stores a student's only attempt at a quiz. Returns `None` when a result
/// already exists, leaving the stored score and grade mapping untouched.
pub(crate) async fn record_quiz_attempt(
    pool: &PgPool,
    student_id: &str,
    quiz_id: &str,
    score: i32,
    now: PrimitiveDateTime,
) -> Result<Option<QuizResult>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let Some(result) = repositories::quizzes::insert_first_result(
        &mut *tx,
        &Uuid::new_v4().to_string(),
        student_id,
        quiz_id,
        score,
        now,
    )
    .await?
    else {
        return Ok(None);
    };
    repositories::students::set_grade(&mut *tx, student_id, &quiz_key(quiz_id), score as f64, now)
        .await?;
    tx.commit().await?;
    Ok(Some(result))
}

/// Returns false when the student does not exist.
pub(crate) async fn record_exam_score(
    pool: &PgPool,
    student_id: &str,
    exam_id: &str,
    score: f64,
    now: PrimitiveDateTime,
) -> Result<bool, sqlx::Error> {
    repositories::students::set_grade(pool, student_id, &exam_key(exam_id), score, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;

    fn assignment(status: AssignmentStatus, grade: Option<f64>) -> Assignment {
        let now = primitive_now_utc();
        Assignment {
            id: Uuid::new_v4().to_string(),
            student_id: "student".to_string(),
            course_id: "course".to_string(),
            title: "Essay".to_string(),
            description: String::new(),
            content: String::new(),
            file_path: None,
            status,
            grade,
            submitted_at: now,
            updated_at: now,
        }
    }

    fn quiz(id: &str) -> Quiz {
        Quiz { id: id.to_string(), lesson_id: "lesson".to_string(), created_at: primitive_now_utc() }
    }

    fn exam(id: &str, status: ExamStatus) -> Exam {
        let now = primitive_now_utc();
        Exam {
            id: id.to_string(),
            course_id: "course".to_string(),
            title: "Final".to_string(),
            description: String::new(),
            exam_date: now,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn no_assignments_counts_as_all_graded() {
        let snapshot = CourseSnapshot::default();
        assert!(snapshot.all_assignments_graded());
        assert!(all_graded(&[]));
    }

    #[test]
    fn pending_assignment_blocks_all_graded() {
        let assignments = vec![
            assignment(AssignmentStatus::Graded, Some(80.0)),
            assignment(AssignmentStatus::Pending, None),
        ];
        assert!(!all_graded(&assignments));
    }

    #[test]
    fn blends_assignments_quiz_and_exam() {
        let mut grades = GradeMap::new();
        grades.insert(quiz_key("q1"), 70.0);
        grades.insert(exam_key("e1"), 60.0);
        let snapshot = CourseSnapshot {
            assignments: vec![
                assignment(AssignmentStatus::Graded, Some(80.0)),
                assignment(AssignmentStatus::Graded, Some(90.0)),
            ],
            grades,
            quiz: Some(quiz("q1")),
            exam: Some(exam("e1", ExamStatus::Graded)),
        };

        assert_eq!(snapshot.final_grade(), 75.0);
        let report = snapshot.report();
        assert!(report.complete);
        assert_eq!(report.assignment_average, 85.0);
    }

    #[test]
    fn empty_course_grades_to_zero() {
        let snapshot = CourseSnapshot::default();
        assert_eq!(snapshot.final_grade(), 0.0);
        assert!(!snapshot.report().complete);
    }

    #[test]
    fn ungraded_assignments_count_in_divisor() {
        let assignments = vec![
            assignment(AssignmentStatus::Graded, Some(90.0)),
            assignment(AssignmentStatus::Submitted, None),
        ];
        assert_eq!(assignment_average(&assignments), 45.0);
    }

    #[test]
    fn grades_for_other_quizzes_are_ignored() {
        let mut grades = GradeMap::new();
        grades.insert(quiz_key("other"), 100.0);
        let snapshot = CourseSnapshot { grades, quiz: Some(quiz("q1")), ..Default::default() };
        assert_eq!(snapshot.quiz_score(), 0.0);
    }

    #[test]
    fn exam_status_drives_completion() {
        let snapshot = CourseSnapshot {
            exam: Some(exam("e1", ExamStatus::Taken)),
            ..Default::default()
        };
        assert!(!snapshot.exam_taken_and_graded());
        assert!(!snapshot.report().complete);
    }

    fn question(id: &str, correct_choice: ChoiceLetter) -> Question {
        Question {
            id: id.to_string(),
            quiz_id: "q1".to_string(),
            text: "?".to_string(),
            choice_a: "a".to_string(),
            choice_b: "b".to_string(),
            choice_c: "c".to_string(),
            choice_d: "d".to_string(),
            correct_choice,
            order_index: 0,
            created_at: primitive_now_utc(),
        }
    }

    #[test]
    fn attempt_scores_share_of_correct_answers() {
        let questions = vec![
            question("1", ChoiceLetter::A),
            question("2", ChoiceLetter::B),
            question("3", ChoiceLetter::C),
        ];
        let mut answers = HashMap::new();
        answers.insert("1".to_string(), ChoiceLetter::A);
        answers.insert("2".to_string(), ChoiceLetter::B);
        answers.insert("3".to_string(), ChoiceLetter::D);
        answers.insert("unknown".to_string(), ChoiceLetter::A);

        assert_eq!(score_attempt(&questions, &answers), 67);
        assert_eq!(score_attempt(&[], &answers), 0);
        assert_eq!(score_attempt(&questions, &HashMap::new()), 0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_to_hundredths(33.333_333), 33.33);
        assert_eq!(round_to_hundredths(66.666_666), 66.67);
        assert_eq!(weighted_grade(100.0 / 3.0, 0.0, 0.0), 16.67);
    }

    #[test]
    fn decimal_halves_round_up_despite_binary_representation() {
        assert_eq!(round_to_hundredths(1.005), 1.01);
        assert_eq!(round_to_hundredths(20.005), 20.01);
        assert_eq!(round_to_hundredths(-1.005), -1.01);
        assert_eq!(round_to_hundredths(1.004_9), 1.0);
        assert_eq!(weighted_grade(2.01, 0.0, 0.0), 1.01);
        assert_eq!(weighted_grade(0.0, 80.02, 0.0), 20.01);
    }
}
