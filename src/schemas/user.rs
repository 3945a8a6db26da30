use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserCreate {
    #[validate(length(min = 1, max = 150, message = "username must be 1..150 characters"))]
    pub(crate) username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[serde(alias = "phoneNumber")]
    pub(crate) phone_number: String,
    pub(crate) password: String,
    #[serde(default)]
    #[serde(alias = "firstName")]
    #[validate(length(max = 150, message = "first_name must be at most 150 characters"))]
    pub(crate) first_name: String,
    #[serde(default)]
    #[serde(alias = "lastName")]
    #[validate(length(max = 150, message = "last_name must be at most 150 characters"))]
    pub(crate) last_name: String,
    #[serde(default)]
    #[serde(alias = "isVerified")]
    pub(crate) is_verified: bool,
    #[serde(default = "default_true")]
    #[serde(alias = "isActive")]
    pub(crate) is_active: bool,
    #[serde(default)]
    #[serde(alias = "isStaff")]
    pub(crate) is_staff: bool,
    #[serde(default)]
    #[serde(alias = "isSuperuser")]
    pub(crate) is_superuser: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserUpdate {
    #[serde(default)]
    #[serde(alias = "firstName")]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    #[serde(alias = "lastName")]
    pub(crate) last_name: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    #[serde(alias = "phoneNumber")]
    pub(crate) phone_number: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default)]
    #[serde(alias = "isVerified")]
    pub(crate) is_verified: Option<bool>,
    #[serde(default)]
    #[serde(alias = "isActive")]
    pub(crate) is_active: Option<bool>,
    #[serde(default)]
    #[serde(alias = "isStaff")]
    pub(crate) is_staff: Option<bool>,
    #[serde(default)]
    #[serde(alias = "isSuperuser")]
    pub(crate) is_superuser: Option<bool>,
}

impl UserUpdate {
    /// Fields only an admin may change.
    pub(crate) fn touches_privileges(&self) -> bool {
        self.is_verified.is_some()
            || self.is_active.is_some()
            || self.is_staff.is_some()
            || self.is_superuser.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserLogin {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) phone_number: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) is_verified: bool,
    pub(crate) is_active: bool,
    pub(crate) is_staff: bool,
    pub(crate) is_superuser: bool,
    pub(crate) last_login: Option<String>,
    pub(crate) date_joined: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: crate::db::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            first_name: user.first_name,
            last_name: user.last_name,
            is_verified: user.is_verified,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            last_login: user.last_login.map(format_primitive),
            date_joined: format_primitive(user.date_joined),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_camel_case_aliases() {
        let payload: UserCreate = serde_json::from_value(serde_json::json!({
            "username": "ada",
            "email": "ada@example.com",
            "phoneNumber": "+15550001111",
            "password": "long-enough",
            "isStaff": true
        }))
        .unwrap();

        assert_eq!(payload.phone_number, "+15550001111");
        assert!(payload.is_staff);
        assert!(payload.is_active);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn create_rejects_bad_email() {
        let payload: UserCreate = serde_json::from_value(serde_json::json!({
            "username": "ada",
            "email": "not-an-email",
            "phone_number": "123",
            "password": "long-enough"
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn privilege_fields_are_detected() {
        let update: UserUpdate =
            serde_json::from_value(serde_json::json!({ "first_name": "Ada" })).unwrap();
        assert!(!update.touches_privileges());

        let update: UserUpdate =
            serde_json::from_value(serde_json::json!({ "is_staff": true })).unwrap();
        assert!(update.touches_privileges());
    }
}
