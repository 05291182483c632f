//! Error taxonomy for the account flow. Validation errors stay local and
//! field-scoped, provider errors carry the HTTP status so they can be mapped
//! to a user-facing message, and nothing is silently swallowed: every failure
//! path ends in a message the UI can show.

use std::fmt;

/// Form field a validation error is scoped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
    AcceptTerms,
    Code,
}

impl fmt::Display for Field {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm_password",
            Field::AcceptTerms => "accept_terms",
            Field::Code => "code",
        };
        write!(formatter, "{name}")
    }
}

/// A single field-scoped validation failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.field, self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Local validation failures; these never reach the network layer.
    Validation(Vec<FieldError>),
    /// The email already has an account; recoverable via the login page.
    DuplicateAccount,
    /// The passcode countdown ran out before submission.
    ExpiredCode,
    /// The provider rejected the request with an HTTP status.
    Provider { status: u16, message: String },
    Network(String),
    Timeout(String),
    Parse(String),
    Config(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(errors) => {
                let joined = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(formatter, "Validation failed: {joined}")
            }
            AuthError::DuplicateAccount => write!(formatter, "Account already exists"),
            AuthError::ExpiredCode => write!(formatter, "Code expired"),
            AuthError::Provider { status, message } => {
                write!(formatter, "Provider error ({status}): {message}")
            }
            AuthError::Network(message) => write!(formatter, "Network error: {message}"),
            AuthError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            AuthError::Parse(message) => write!(formatter, "Response error: {message}"),
            AuthError::Config(message) => write!(formatter, "Config error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Translate into the message shown to the user.
    ///
    /// Provider statuses map through a small classification table; anything
    /// else falls back to the raw provider message or a generic retry prompt.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Provider { status: 400, .. } => "Invalid email or password format".to_string(),
            AuthError::Provider { status: 422, .. } => "Email already registered".to_string(),
            AuthError::Provider { status: 429, .. } => {
                "Too many attempts. Please try again later".to_string()
            }
            AuthError::Provider { message, .. } => message.clone(),
            AuthError::Validation(errors) => errors
                .iter()
                .map(|error| error.message.clone())
                .collect::<Vec<_>>()
                .join("; "),
            AuthError::DuplicateAccount => crate::flow::handoff::DUPLICATE_ACCOUNT_MESSAGE.to_string(),
            AuthError::ExpiredCode => {
                "The verification code has expired. Please request a new one.".to_string()
            }
            AuthError::Network(_) | AuthError::Timeout(_) => {
                "Unable to reach the service. Please try again.".to_string()
            }
            AuthError::Parse(_) | AuthError::Config(_) => {
                "An unexpected error occurred. Please try again".to_string()
            }
        }
    }

    /// Whether the provider reported the email as already registered.
    ///
    /// The duplicate pre-check and account creation are not atomic, so this
    /// catches the race where the account appeared in between.
    #[must_use]
    pub fn is_already_registered(&self) -> bool {
        match self {
            AuthError::DuplicateAccount => true,
            AuthError::Provider { status: 422, .. } => true,
            AuthError::Provider { message, .. } => {
                message.to_lowercase().contains("already registered")
            }
            _ => false,
        }
    }

    /// Map a transport failure into the taxonomy.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout("Request timed out. Please try again.".to_string())
        } else if err.is_decode() {
            AuthError::Parse(format!("Failed to decode response: {err}"))
        } else {
            AuthError::Network(format!("Unable to reach the server: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_classifies_provider_statuses() {
        let bad_request = AuthError::Provider {
            status: 400,
            message: "invalid grant".to_string(),
        };
        assert_eq!(bad_request.user_message(), "Invalid email or password format");

        let duplicate = AuthError::Provider {
            status: 422,
            message: "User already registered".to_string(),
        };
        assert_eq!(duplicate.user_message(), "Email already registered");

        let limited = AuthError::Provider {
            status: 429,
            message: "over_email_send_rate_limit".to_string(),
        };
        assert_eq!(
            limited.user_message(),
            "Too many attempts. Please try again later"
        );

        let other = AuthError::Provider {
            status: 500,
            message: "service unavailable".to_string(),
        };
        assert_eq!(other.user_message(), "service unavailable");
    }

    #[test]
    fn user_message_joins_field_errors() {
        let error = AuthError::Validation(vec![
            FieldError::new(Field::Email, "Please enter a valid email address"),
            FieldError::new(Field::AcceptTerms, "You must accept the terms and conditions"),
        ]);
        assert_eq!(
            error.user_message(),
            "Please enter a valid email address; You must accept the terms and conditions"
        );
    }

    #[test]
    fn already_registered_matches_status_and_message() {
        assert!(AuthError::DuplicateAccount.is_already_registered());
        assert!(AuthError::Provider {
            status: 422,
            message: "Unprocessable".to_string()
        }
        .is_already_registered());
        assert!(AuthError::Provider {
            status: 400,
            message: "User already registered".to_string()
        }
        .is_already_registered());
        assert!(!AuthError::Provider {
            status: 400,
            message: "invalid email".to_string()
        }
        .is_already_registered());
        assert!(!AuthError::ExpiredCode.is_already_registered());
    }

    #[test]
    fn display_includes_status() {
        let error = AuthError::Provider {
            status: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(error.to_string(), "Provider error (429): slow down");
    }
}
