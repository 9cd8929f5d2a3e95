//! Field-level acceptance rules for student input.
//!
//! # Responsibility
//! - Decide whether raw name/email/age/course values may be persisted.
//!
//! # Invariants
//! - Predicates are pure: no I/O, no allocation beyond lazy regex compile.
//! - Patterns are anchored and must match the whole input.
//! - The email rule only requires a non-empty tail after `@`; domain syntax
//!   is not checked.

use once_cell::sync::Lazy;
use regex::Regex;

pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 149;
pub const MIN_COURSE_CHARS: usize = 2;
pub const MAX_COURSE_CHARS: usize = 100;

// ASCII letters plus the ASCII whitespace set ( \t\n\x0B\f\r).
static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z \t\n\x0B\x0C\r]{2,50}$").expect("valid name regex")
});
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").expect("valid email regex"));

/// Accepts 2 to 50 characters drawn from letters and whitespace.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Accepts `local@anything` where `local` uses `[A-Za-z0-9+_.-]`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_age(age: i32) -> bool {
    (MIN_AGE..=MAX_AGE).contains(&age)
}

/// Accepts course names whose trimmed length is within `[2, 100]` characters.
pub fn is_valid_course(course: &str) -> bool {
    let length = course.trim().chars().count();
    (MIN_COURSE_CHARS..=MAX_COURSE_CHARS).contains(&length)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_age, is_valid_course, is_valid_email, is_valid_name};

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(!is_valid_age(0));
        assert!(is_valid_age(1));
        assert!(is_valid_age(149));
        assert!(!is_valid_age(150));
        assert!(!is_valid_age(-3));
    }

    #[test]
    fn email_requires_at_sign_and_tail() {
        assert!(is_valid_email("a@b"));
        assert!(is_valid_email("first.last+tag@example.co.uk"));
        assert!(!is_valid_email("a.b"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("@b"));
        assert!(!is_valid_email("ann lee@x.com"));
    }

    #[test]
    fn email_domain_is_permissive() {
        assert!(is_valid_email("ann@@x"));
        assert!(is_valid_email("ann@not a domain"));
    }

    #[test]
    fn name_accepts_letters_and_whitespace_only() {
        assert!(is_valid_name("Ann Lee"));
        assert!(is_valid_name("Al"));
        assert!(!is_valid_name("Ann123"));
        assert!(!is_valid_name("A"));
        assert!(!is_valid_name("O'Brien"));
        assert!(!is_valid_name("Zoë"));
        assert!(is_valid_name(&"a".repeat(50)));
        assert!(!is_valid_name(&"a".repeat(51)));
    }

    #[test]
    fn course_length_is_measured_after_trim() {
        assert!(is_valid_course("CS"));
        assert!(is_valid_course("  CS  "));
        assert!(!is_valid_course(" C "));
        assert!(!is_valid_course(""));
        assert!(is_valid_course(&"x".repeat(100)));
        assert!(!is_valid_course(&"x".repeat(101)));
    }
}
