use serde::{Deserialize, Serialize};
use time::Date;

use crate::api::pagination::default_limit;
use crate::core::time::{format_date, format_primitive};
use crate::db::types::{AssignmentStatus, ExamStatus};
use crate::repositories::assignments::AssignmentListRow;
use crate::repositories::certificates::CertificateListRow;
use crate::repositories::exams::ExamListRow;
use crate::repositories::students::StudentListRow;

/// How one entity is presented on the admin surface.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct AdminEntity {
    pub(crate) entity: &'static str,
    pub(crate) list_display: &'static [&'static str],
    pub(crate) list_filter: &'static [&'static str],
    pub(crate) search_fields: &'static [&'static str],
    pub(crate) ordering: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminListQuery {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
    #[serde(default)]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) course_id: Option<String>,
    #[serde(default)]
    pub(crate) issued_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminAssignmentItem {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) student_id: String,
    pub(crate) student: String,
    pub(crate) course_id: String,
    pub(crate) course: String,
    pub(crate) status: AssignmentStatus,
    pub(crate) grade: Option<f64>,
}

impl AdminAssignmentItem {
    pub(crate) fn from_row(row: AssignmentListRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            student_id: row.student_id,
            student: row.student_username,
            course_id: row.course_id,
            course: row.course_title,
            status: row.status,
            grade: row.grade,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminExamItem {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) course_id: String,
    pub(crate) course: String,
    pub(crate) status: ExamStatus,
    pub(crate) exam_date: String,
}

impl AdminExamItem {
    pub(crate) fn from_row(row: ExamListRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            course_id: row.course_id,
            course: row.course_title,
            status: row.status,
            exam_date: format_primitive(row.exam_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminCertificateItem {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student: String,
    pub(crate) course_id: String,
    pub(crate) course: String,
    pub(crate) issued_date: String,
}

impl AdminCertificateItem {
    pub(crate) fn from_row(row: CertificateListRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            student: row.student_username,
            course_id: row.course_id,
            course: row.course_title,
            issued_date: format_date(row.issued_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminStudentItem {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) user: String,
    pub(crate) created_at: String,
}

impl AdminStudentItem {
    pub(crate) fn from_row(row: StudentListRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user: row.username,
            created_at: format_primitive(row.created_at),
        }
    }
}

pub(crate) fn parse_issued_date(raw: &str) -> Option<Date> {
    Date::parse(raw, &time::macros::format_description!("[year]-[month]-[day]")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_date_parses_iso_days() {
        let date = parse_issued_date("2025-02-28").unwrap();
        assert_eq!(format_date(date), "2025-02-28");
        assert!(parse_issued_date("28/02/2025").is_none());
    }
}
