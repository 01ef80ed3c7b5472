use crate::utils::error::AppError;

/// Rejects blank values and values shorter than `min` characters (after trimming).
pub fn require_min_len(field: &str, value: &str, min: usize) -> Result<(), AppError> {
    if value.trim().chars().count() < min {
        return Err(AppError::validation(format!(
            "{}: must be at least {} characters",
            field, min
        )));
    }
    Ok(())
}

/// Shape check only: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub fn require_email(field: &str, email: &str) -> Result<(), AppError> {
    if !is_valid_email(email) {
        return Err(AppError::validation(format!("{}: invalid email address", field)));
    }
    Ok(())
}
