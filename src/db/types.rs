use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "assignmentstatus", rename_all = "lowercase")]
pub(crate) enum AssignmentStatus {
    Submitted,
    Pending,
    Graded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "examstatus", rename_all = "snake_case")]
pub(crate) enum ExamStatus {
    NotTaken,
    Taken,
    Graded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "choiceletter")]
pub(crate) enum ChoiceLetter {
    A,
    B,
    C,
    D,
}

impl AssignmentStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::Graded => "graded",
        }
    }
}

impl ExamStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::NotTaken => "not_taken",
            Self::Taken => "taken",
            Self::Graded => "graded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_status_serializes_snake_case() {
        assert_eq!(serde_json::to_value(ExamStatus::NotTaken).unwrap(), "not_taken");
        let parsed: ExamStatus = serde_json::from_value(serde_json::json!("graded")).unwrap();
        assert_eq!(parsed, ExamStatus::Graded);
    }

    #[test]
    fn choice_letters_are_uppercase() {
        assert_eq!(serde_json::to_value(ChoiceLetter::C).unwrap(), "C");
        assert!(serde_json::from_value::<ChoiceLetter>(serde_json::json!("e")).is_err());
    }

    #[test]
    fn as_str_matches_serde() {
        for status in [AssignmentStatus::Submitted, AssignmentStatus::Pending, AssignmentStatus::Graded]
        {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
        for status in [ExamStatus::NotTaken, ExamStatus::Taken, ExamStatus::Graded] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }
}
