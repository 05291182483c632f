//! Boundary to the hosted identity/data provider. The flow only ever talks to
//! this trait; the production implementation lives in [`http`] and test
//! doubles stand in everywhere else. The provider owns all persistent account
//! state, including the server-side passcode expiry, which is authoritative
//! over the local countdown.

pub mod http;

use crate::errors::AuthError;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row from the public profile table, used for the duplicate pre-check.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
}

/// Non-credential metadata attached to a new account.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountMetadata {
    pub full_name: String,
}

/// Account details embedded in a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountInfo {
    pub id: Uuid,
    pub email: String,
}

/// Provider-issued session returned by sign-in and session restore.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub refresh_token: String,
    pub user: AccountInfo,
}

/// Capabilities consumed from the hosted provider.
///
/// Errors come back as [`AuthError`] already mapped through the taxonomy, so
/// callers can classify without knowing the wire format.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Look up an existing profile by normalized email; at most one row.
    async fn lookup_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError>;

    /// Create an account with the identity service. `redirect_to` is where
    /// the provider sends the user after post-verification login.
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &AccountMetadata,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError>;

    /// Email a fresh one-time passcode to the address.
    async fn issue_passcode(&self, email: &str, redirect_to: Option<&str>) -> Result<(), AuthError>;

    /// Ask the provider to confirm a submitted passcode.
    async fn verify_passcode(&self, email: &str, code: &str) -> Result<(), AuthError>;

    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError>;

    /// Recover the session held by the provider client, if any.
    async fn restore_session(&self) -> Result<Option<Session>, AuthError>;
}
