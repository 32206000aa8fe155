use once_cell::sync::Lazy;
use regex::Regex;

/// Input validation utilities for catalog service

// Compile regex patterns once at startup
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    // This regex is hardcoded and validated - it is a compile-time constant in practice
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$")
        .expect("hardcoded slug regex is invalid - fix source code")
});

/// Validate email format (RFC 5322 simplified)
pub fn validate_email(email: &str) -> bool {
    !email.is_empty() && email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Validate URL-safe slug (lowercase, digits, single hyphens)
pub fn validate_slug(slug: &str) -> bool {
    !slug.is_empty() && slug.len() <= 64 && SLUG_REGEX.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com"));
        assert!(validate_email("test.user+tag@sub.example.co.uk"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!validate_email("invalid"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_valid_slug() {
        assert!(validate_slug("amateur"));
        assert!(validate_slug("big-name-studio-2"));
    }

    #[test]
    fn test_invalid_slug() {
        assert!(!validate_slug("Has-Caps"));
        assert!(!validate_slug("double--hyphen"));
        assert!(!validate_slug("-leading"));
        assert!(!validate_slug(""));
    }
}
