//! Local form validation for the signup and login forms. Everything here runs
//! before any network call; a request that fails validation never reaches the
//! provider.

use crate::errors::{Field, FieldError};
use crate::flow::registration::RegistrationRequest;
use regex::Regex;
use secrecy::ExposeSecret;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// One-time passcodes are exactly this many digits.
pub const CODE_LENGTH: usize = 6;

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Whether a submitted passcode has the right shape to send to the provider.
#[must_use]
pub fn valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.chars().all(|c| c.is_ascii_digit())
}

/// Validate a registration request, reporting every failing field.
#[must_use]
pub fn validate_registration(request: &RegistrationRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        errors.push(FieldError::new(
            Field::Email,
            "Please enter a valid email address",
        ));
    }

    let password = request.password.expose_secret();
    errors.extend(password_field_errors(password));

    if password != request.confirm_password.expose_secret() {
        errors.push(FieldError::new(
            Field::ConfirmPassword,
            "Passwords do not match",
        ));
    }

    if !request.accept_terms {
        errors.push(FieldError::new(
            Field::AcceptTerms,
            "You must accept the terms and conditions",
        ));
    }

    errors
}

/// Password policy: minimum length plus upper, lower, digit and symbol classes.
fn password_field_errors(password: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            Field::Password,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    if !password.chars().any(char::is_uppercase) {
        errors.push(FieldError::new(
            Field::Password,
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        errors.push(FieldError::new(
            Field::Password,
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(
            Field::Password,
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        errors.push(FieldError::new(
            Field::Password,
            "Password must contain at least one special character",
        ));
    }

    errors
}

/// Coarse strength bucket driving the signup form's strength indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Fair,
    Strong,
}

/// Score a password for display purposes only; the policy above is the gate.
#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    let mut score = 0;
    if password.len() >= MIN_PASSWORD_LENGTH {
        score += 1;
    }
    if password.len() >= 12 {
        score += 1;
    }
    if password.chars().any(char::is_uppercase) {
        score += 1;
    }
    if password.chars().any(char::is_lowercase) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    match score {
        0..=2 => PasswordStrength::Weak,
        3..=4 => PasswordStrength::Fair,
        _ => PasswordStrength::Strong,
    }
}
