//! Registration stage: validate the signup form locally, pre-check the
//! profile table for the email, create the account, and hand over to passcode
//! verification. The pre-check and account creation are not atomic, so the
//! provider's own "already registered" verdict is honored as a second line of
//! defense.

use crate::{
    errors::AuthError,
    errors::FieldError,
    flow::handoff::SessionOutcome,
    flow::verification::VerificationCodeController,
    provider::{AccountMetadata, IdentityProvider},
    validate,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, error};

/// Signup form input. Discarded after submission; nothing is kept locally.
#[derive(Clone, Debug)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub accept_terms: bool,
}

/// Result of a registration submission.
pub enum SubmitOutcome<P: IdentityProvider> {
    /// The account was created and a passcode is on its way; the controller
    /// owns the rest of the verification flow.
    Submitted(VerificationCodeController<P>),
    /// The email already has an account; the outcome routes to login.
    DuplicateAccount(SessionOutcome),
    /// Local validation failed; nothing was sent to the provider.
    ValidationFailed(Vec<FieldError>),
    /// The provider refused the request for some other reason.
    ProviderError(AuthError),
}

/// Submits validated registrations to the identity provider.
pub struct RegistrationSubmitter<P: IdentityProvider> {
    provider: Arc<P>,
    login_redirect: Option<String>,
}

impl<P: IdentityProvider> RegistrationSubmitter<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, login_redirect: Option<String>) -> Self {
        Self {
            provider,
            login_redirect,
        }
    }

    /// Run the registration stage end to end.
    ///
    /// Validation errors never reach the network. A duplicate found by the
    /// pre-check short-circuits with zero `create_account` calls; a
    /// successful creation triggers exactly one passcode issuance.
    pub async fn submit(&self, request: RegistrationRequest) -> SubmitOutcome<P> {
        let errors = validate::validate_registration(&request);
        if !errors.is_empty() {
            return SubmitOutcome::ValidationFailed(errors);
        }

        let email = validate::normalize_email(&request.email);

        match self.provider.lookup_profile_by_email(&email).await {
            Ok(Some(_)) => {
                debug!("duplicate email found by pre-check");
                return SubmitOutcome::DuplicateAccount(SessionOutcome::duplicate(&email));
            }
            Ok(None) => {}
            Err(err) => {
                error!("profile pre-check failed: {err}");
                return SubmitOutcome::ProviderError(err);
            }
        }

        let metadata = AccountMetadata::default();
        if let Err(err) = self
            .provider
            .create_account(
                &email,
                &request.password,
                &metadata,
                self.login_redirect.as_deref(),
            )
            .await
        {
            // The pre-check and creation are not atomic; the account may
            // have appeared in between.
            if err.is_already_registered() {
                debug!("provider reported the email as already registered");
                return SubmitOutcome::DuplicateAccount(SessionOutcome::duplicate(&email));
            }
            error!("account creation failed: {err}");
            return SubmitOutcome::ProviderError(err);
        }

        match VerificationCodeController::start(Arc::clone(&self.provider), email).await {
            Ok(controller) => SubmitOutcome::Submitted(controller),
            Err(err) => {
                error!("passcode issuance failed: {err}");
                SubmitOutcome::ProviderError(err)
            }
        }
    }
}
