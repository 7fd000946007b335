//! Input validation and sanitization rules.

/// Maximum cover letter length.
pub const MAX_COVER_LETTER_LENGTH: usize = 2000;

/// Maximum free-text field length (bios, descriptions, notes).
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Job title bounds.
pub const JOB_TITLE_MIN: usize = 5;
pub const JOB_TITLE_MAX: usize = 150;

/// Minimum job description length.
pub const JOB_DESCRIPTION_MIN: usize = 50;

/// Minimum password length.
pub const PASSWORD_MIN: usize = 8;

/// Strip control characters and cap the length of a user-provided string.
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_TEXT_LENGTH)
        .collect()
}

/// Shallow email shape check: one `@` with a dotted domain. Deliverability
/// is not this layer's problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > 254 {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

/// Password policy: at least [`PASSWORD_MIN`] characters with an uppercase
/// letter, a lowercase letter, and a digit.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < PASSWORD_MIN {
        return Err(format!(
            "Password must be at least {PASSWORD_MIN} characters"
        ));
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err("Password must contain uppercase, lowercase, and number".to_string());
    }
    Ok(())
}

/// Validate a job posting's user-facing fields.
pub fn validate_job_fields(title: &str, description: &str, location: &str) -> Result<(), String> {
    let title = title.trim();
    if title.len() < JOB_TITLE_MIN || title.len() > JOB_TITLE_MAX {
        return Err(format!(
            "Job title must be {JOB_TITLE_MIN}-{JOB_TITLE_MAX} characters"
        ));
    }
    if description.trim().len() < JOB_DESCRIPTION_MIN {
        return Err(format!(
            "Description must be at least {JOB_DESCRIPTION_MIN} characters"
        ));
    }
    if location.trim().is_empty() {
        return Err("Location is required".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last@sub.example.co.ke"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.leading"));
        assert!(!is_valid_email("spaced user@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("Passw0rd").is_ok());
        assert!(validate_password_strength("short1A").is_err());
        assert!(validate_password_strength("alllowercase1").is_err());
        assert!(validate_password_strength("ALLUPPERCASE1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
    }

    #[test]
    fn test_job_field_validation() {
        let description = "We are hiring a backend engineer to build our core platform services.";
        assert!(validate_job_fields("Backend Engineer", description, "Nairobi").is_ok());
        assert!(validate_job_fields("Dev", description, "Nairobi").is_err());
        assert!(validate_job_fields("Backend Engineer", "Too short", "Nairobi").is_err());
        assert!(validate_job_fields("Backend Engineer", description, "  ").is_err());
    }

    #[test]
    fn test_sanitize_strips_control_chars() {
        assert_eq!(sanitize_string("hello\u{0}world"), "helloworld");
        assert_eq!(sanitize_string("keep\nnewlines\tand tabs"), "keep\nnewlines\tand tabs");
    }
}
