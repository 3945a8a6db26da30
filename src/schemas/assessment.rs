use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime, PrimitiveDateTime};
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::{Assignment, Certificate, Exam, Feedback, FinalGrade, QuizResult};
use crate::db::types::{AssignmentStatus, ChoiceLetter, ExamStatus};
use crate::services::grading::ProgressReport;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) content: String,
    #[serde(default)]
    #[serde(alias = "filePath")]
    #[validate(length(max = 255, message = "file_path must be at most 255 characters"))]
    pub(crate) file_path: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssignmentUpdate {
    #[serde(default)]
    pub(crate) status: Option<AssignmentStatus>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0, message = "grade must be in range 0..100"))]
    pub(crate) grade: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) content: String,
    pub(crate) file_path: Option<String>,
    pub(crate) status: AssignmentStatus,
    pub(crate) grade: Option<f64>,
    pub(crate) submitted_at: String,
    pub(crate) updated_at: String,
}

impl AssignmentResponse {
    pub(crate) fn from_db(assignment: Assignment) -> Self {
        Self {
            id: assignment.id,
            student_id: assignment.student_id,
            course_id: assignment.course_id,
            title: assignment.title,
            description: assignment.description,
            content: assignment.content,
            file_path: assignment.file_path,
            status: assignment.status,
            grade: assignment.grade,
            submitted_at: format_primitive(assignment.submitted_at),
            updated_at: format_primitive(assignment.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1..255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(alias = "examDate", deserialize_with = "deserialize_offset_datetime_flexible")]
    pub(crate) exam_date: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamStatusUpdate {
    pub(crate) status: ExamStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) exam_date: String,
    pub(crate) status: ExamStatus,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam) -> Self {
        Self {
            id: exam.id,
            course_id: exam.course_id,
            title: exam.title,
            description: exam.description,
            exam_date: format_primitive(exam.exam_date),
            status: exam.status,
            updated_at: format_primitive(exam.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamScoreRecord {
    #[serde(alias = "studentId")]
    pub(crate) student_id: String,
    #[validate(range(min = 0.0, max = 100.0, message = "score must be in range 0..100"))]
    pub(crate) score: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamScoreResponse {
    pub(crate) exam_id: String,
    pub(crate) student_id: String,
    pub(crate) key: String,
    pub(crate) score: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizResultRecord {
    #[serde(alias = "studentId")]
    pub(crate) student_id: String,
    #[validate(range(min = 0, max = 100, message = "score must be in range 0..100"))]
    pub(crate) score: i32,
}

/// A student's answers keyed by question id.
#[derive(Debug, Deserialize)]
pub(crate) struct QuizAttempt {
    pub(crate) answers: HashMap<String, ChoiceLetter>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResultResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) quiz_id: String,
    pub(crate) score: i32,
    pub(crate) recorded_at: String,
}

impl QuizResultResponse {
    pub(crate) fn from_db(result: QuizResult) -> Self {
        Self {
            id: result.id,
            student_id: result.student_id,
            quiz_id: result.quiz_id,
            score: result.score,
            recorded_at: format_primitive(result.recorded_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct FeedbackCreate {
    #[serde(alias = "feedbackText")]
    #[validate(length(min = 1, message = "feedback_text must not be empty"))]
    pub(crate) feedback_text: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) feedback_text: String,
    pub(crate) submitted_at: String,
}

impl FeedbackResponse {
    pub(crate) fn from_db(feedback: Feedback) -> Self {
        Self {
            id: feedback.id,
            student_id: feedback.student_id,
            course_id: feedback.course_id,
            feedback_text: feedback.feedback_text,
            submitted_at: format_primitive(feedback.submitted_at),
        }
    }
}

/// Admins and instructors name the student; students read their own progress.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StudentQuery {
    #[serde(default)]
    pub(crate) student_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    #[serde(flatten)]
    pub(crate) report: ProgressReport,
}

/// The three grading checks, each evaluated on its own.
#[derive(Debug, Serialize)]
pub(crate) struct EligibilityResponse {
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) all_assignments_graded: bool,
    pub(crate) exam_taken_and_graded: bool,
    pub(crate) final_grade: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct FinalGradeResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) final_grade: f64,
    pub(crate) complete: bool,
    pub(crate) calculated_at: String,
}

impl FinalGradeResponse {
    pub(crate) fn from_db(grade: FinalGrade, complete: bool) -> Self {
        Self {
            id: grade.id,
            student_id: grade.student_id,
            course_id: grade.course_id,
            final_grade: grade.final_grade,
            complete,
            calculated_at: format_primitive(grade.calculated_at),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct CertificateCreate {
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[serde(alias = "studentPhoto")]
    #[validate(length(min = 1, max = 255, message = "student_photo must be 1..255 characters"))]
    pub(crate) student_photo: Option<String>,
    #[serde(default)]
    #[serde(alias = "companyLogo")]
    #[validate(length(min = 1, max = 255, message = "company_logo must be 1..255 characters"))]
    pub(crate) company_logo: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CertificateResponse {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) course_id: String,
    pub(crate) description: String,
    pub(crate) student_photo: String,
    pub(crate) company_logo: String,
    pub(crate) issued_date: String,
}

impl CertificateResponse {
    pub(crate) fn from_db(certificate: Certificate) -> Self {
        Self {
            id: certificate.id,
            student_id: certificate.student_id,
            course_id: certificate.course_id,
            description: certificate.description,
            student_photo: certificate.student_photo,
            company_logo: certificate.company_logo,
            issued_date: format_date(certificate.issued_date),
        }
    }
}

fn parse_offset_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    // datetime-local inputs arrive without an offset; treat them as UTC.
    if raw.len() == 19 && raw.as_bytes().get(10) == Some(&b'T') {
        if let Ok(value) = OffsetDateTime::parse(&format!("{raw}Z"), &Rfc3339) {
            return Some(value);
        }
    }

    PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn deserialize_offset_datetime_flexible<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_offset_datetime_flexible(&raw)
        .ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_date_accepts_rfc3339_and_local_forms() {
        let rfc: ExamCreate = serde_json::from_value(serde_json::json!({
            "title": "Final",
            "exam_date": "2025-06-01T09:30:00+03:00"
        }))
        .unwrap();
        assert_eq!(rfc.exam_date.hour(), 9);

        let local: ExamCreate = serde_json::from_value(serde_json::json!({
            "title": "Final",
            "examDate": "2025-06-01T09:30"
        }))
        .unwrap();
        assert_eq!(local.exam_date.offset(), time::UtcOffset::UTC);
        assert_eq!(local.exam_date.minute(), 30);
    }

    #[test]
    fn exam_date_rejects_garbage() {
        let parsed: Result<ExamCreate, _> = serde_json::from_value(serde_json::json!({
            "title": "Final",
            "exam_date": "next tuesday"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn scores_outside_range_fail_validation() {
        let record = QuizResultRecord { student_id: "s".to_string(), score: 101 };
        assert!(record.validate().is_err());

        let record = ExamScoreRecord { student_id: "s".to_string(), score: -0.5 };
        assert!(record.validate().is_err());

        let update = AssignmentUpdate { status: None, grade: Some(100.0) };
        assert!(update.validate().is_ok());
    }
}
