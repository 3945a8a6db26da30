use crate::api::errors::ApiError;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
const MAX_PHONE_LEN: usize = 15;

/// Digits with an optional leading `+`, at most 15 characters overall.
pub(crate) fn validate_phone_number(phone: &str) -> Result<(), ApiError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = !digits.is_empty()
        && phone.len() <= MAX_PHONE_LEN
        && digits.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Invalid phone number format".to_string()))
    }
}

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

/// Runs the `validator` derive checks and reports failures as 400.
pub(crate) fn validate_payload(payload: &impl validator::Validate) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_numbers() {
        assert!(validate_phone_number("+79991234567").is_ok());
        assert!(validate_phone_number("5551234").is_ok());
        assert!(validate_phone_number("+").is_err());
        assert!(validate_phone_number("555-1234").is_err());
        assert!(validate_phone_number("1234567890123456").is_err());
    }

    #[test]
    fn password_length_counts_chars() {
        assert!(validate_password_len("short").is_err());
        assert!(validate_password_len("пароль12").is_ok());
    }
}
