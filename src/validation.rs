//! Shape checks for contact input.
//!
//! Pure functions: no I/O and no storage lookups. Whether an email is
//! already taken is decided by the service layer, not here.

use regex::Regex;
use std::sync::OnceLock;

pub const MAX_NAME_LEN: usize = 50;

/// Result of validating a candidate contact. `errors` is empty iff valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

pub fn validate_name(name: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push("Name is required".to_string());
        return errors;
    }
    if name.chars().count() > MAX_NAME_LEN {
        errors.push(format!("Name must be {} characters or less", MAX_NAME_LEN));
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        errors.push("Name can only contain letters and spaces".to_string());
    }
    errors
}

pub fn validate_email(email: &str) -> Vec<String> {
    if email.trim().is_empty() {
        return vec!["Email is required".to_string()];
    }
    if !email_regex().is_match(email) {
        return vec!["Email must be a valid email address".to_string()];
    }
    Vec::new()
}

/// Runs every rule and collects all failures.
pub fn validate_contact(name: &str, email: &str) -> ValidationReport {
    let mut errors = validate_name(name);
    errors.extend(validate_email(email));
    ValidationReport { errors }
}
