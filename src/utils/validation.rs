use validator::ValidationError;

const SPECIAL_CHARS: &str = "@#$%";

/// Signup password rule: at least one digit, one lowercase, one
/// uppercase, and one of `@#$%`. Length limits live on the DTO.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    if has_digit && has_lower && has_upper && has_special {
        Ok(())
    } else {
        Err(ValidationError::new("weak_password"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strong_password() {
        assert!(validate_password_strength("Abcdef1#").is_ok());
    }

    #[test]
    fn rejects_missing_classes() {
        assert!(validate_password_strength("abcdef1#").is_err()); // no upper
        assert!(validate_password_strength("ABCDEF1#").is_err()); // no lower
        assert!(validate_password_strength("Abcdefg#").is_err()); // no digit
        assert!(validate_password_strength("Abcdefg1").is_err()); // no special
    }
}
