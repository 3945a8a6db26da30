use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{GradeMap, Instructor, Student};

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct StudentCreate {
    /// Admins may create a profile for another user; everyone else gets their own.
    #[serde(default)]
    #[serde(alias = "userId")]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "profilePicture")]
    #[validate(length(max = 255, message = "profile_picture must be at most 255 characters"))]
    pub(crate) profile_picture: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct StudentUpdate {
    #[serde(default)]
    #[serde(alias = "profilePicture")]
    #[validate(length(max = 255, message = "profile_picture must be at most 255 characters"))]
    pub(crate) profile_picture: Option<String>,
    #[serde(default)]
    #[serde(alias = "trackRecord")]
    pub(crate) track_record: Option<String>,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
    #[serde(default)]
    #[serde(alias = "certificatePhoto")]
    #[validate(length(max = 255, message = "certificate_photo must be at most 255 characters"))]
    pub(crate) certificate_photo: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) profile_picture: Option<String>,
    pub(crate) track_record: String,
    pub(crate) feedback: String,
    pub(crate) grades: GradeMap,
    pub(crate) certificate_photo: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl StudentResponse {
    pub(crate) fn from_db(student: Student) -> Self {
        Self {
            id: student.id,
            user_id: student.user_id,
            profile_picture: student.profile_picture,
            track_record: student.track_record,
            feedback: student.feedback,
            grades: student.grades.0,
            certificate_photo: student.certificate_photo,
            created_at: format_primitive(student.created_at),
            updated_at: format_primitive(student.updated_at),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct InstructorCreate {
    #[serde(default)]
    #[serde(alias = "userId")]
    pub(crate) user_id: Option<String>,
    #[serde(default)]
    #[serde(alias = "profilePicture")]
    #[validate(length(max = 255, message = "profile_picture must be at most 255 characters"))]
    pub(crate) profile_picture: Option<String>,
    #[serde(default)]
    #[serde(alias = "verificationCode")]
    #[validate(length(equal = 6, message = "verification_code must be exactly 6 characters"))]
    pub(crate) verification_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InstructorResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) profile_picture: Option<String>,
    pub(crate) created_at: String,
}

impl InstructorResponse {
    pub(crate) fn from_db(instructor: Instructor) -> Self {
        Self {
            id: instructor.id,
            user_id: instructor.user_id,
            profile_picture: instructor.profile_picture,
            created_at: format_primitive(instructor.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_code_must_be_six_characters() {
        let payload = InstructorCreate {
            verification_code: Some("12345".to_string()),
            ..Default::default()
        };
        assert!(payload.validate().is_err());

        let payload = InstructorCreate {
            verification_code: Some("123456".to_string()),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }
}
