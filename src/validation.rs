use crate::error::AppError;

/// Trim a required text field, rejecting it when nothing is left.
pub fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trim and syntax-check an email address.
pub fn email(value: &str) -> Result<String, AppError> {
    let email = required(value, "Email")?;
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(AppError::Validation("Invalid email format".to_string()))
    }
}

pub fn is_valid_email(value: &str) -> bool {
    !value.contains(['\r', '\n']) && value.parse::<lettre::Address>().is_ok()
}
