//! Login stage the flow hands off into. Verified users land here with their
//! email pre-filled; a successful sign-in stores the provider session in the
//! shared context and routes to the authenticated landing area.

use crate::{
    errors::{AuthError, Field, FieldError},
    flow::handoff::SessionOutcome,
    provider::IdentityProvider,
    session::SessionContext,
    validate,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Sign in with email and password, storing the session on success.
///
/// Empty or malformed input is rejected locally; provider failures map
/// through the shared classification via [`AuthError::user_message`].
pub async fn submit_login<P: IdentityProvider>(
    provider: &P,
    session: &SessionContext,
    email: &str,
    password: &SecretString,
) -> Result<SessionOutcome, AuthError> {
    let email = validate::normalize_email(email);

    let mut errors = Vec::new();
    if !validate::valid_email(&email) {
        errors.push(FieldError::new(
            Field::Email,
            "Please enter a valid email address",
        ));
    }
    if password.expose_secret().trim().is_empty() {
        errors.push(FieldError::new(Field::Password, "Password is required"));
    }
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let provider_session = provider.sign_in(&email, password).await?;
    debug!("sign-in succeeded");
    session.set_session(provider_session);

    Ok(SessionOutcome::signed_in())
}
