//! HTTP implementation of [`IdentityProvider`] against a Supabase-style
//! hosted backend: the auth API (`/auth/v1`) for accounts, passcodes and
//! sessions, and the table API (`/rest/v1`) for the profile pre-check. Every
//! request carries the project `apikey` header. Raw credentials only appear
//! inside request bodies and are never logged.

use super::{AccountMetadata, IdentityProvider, Profile, Session};
use crate::{config::FlowConfig, errors::AuthError, APP_USER_AGENT};
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

/// Client for the hosted identity/data provider.
pub struct HostedProvider {
    client: Client,
    base_url: Url,
    anon_key: SecretString,
    /// Last session handed out by the provider, kept for restore.
    session: RwLock<Option<Session>>,
}

impl HostedProvider {
    /// Build a provider client from validated configuration.
    pub fn new(config: &FlowConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.provider_url.clone(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(endpoint)
            .map_err(|err| AuthError::Config(format!("invalid endpoint {endpoint}: {err}")))
    }

    /// Turn a non-success response into a provider error, extracting the
    /// message from the common body shapes (`msg`, `error_description`,
    /// `message`).
    async fn error_from_response(response: Response) -> AuthError {
        let status = response.status().as_u16();
        let message = match response.json::<Value>().await {
            Ok(body) => body["msg"]
                .as_str()
                .or_else(|| body["error_description"].as_str())
                .or_else(|| body["message"].as_str())
                .unwrap_or("request failed")
                .to_string(),
            Err(_) => "request failed".to_string(),
        };

        AuthError::Provider { status, message }
    }

    async fn expect_success(response: Response) -> Result<Response, AuthError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn store_session(&self, session: &Session) {
        *self.session.write().await = Some(session.clone());
    }
}

impl IdentityProvider for HostedProvider {
    async fn lookup_profile_by_email(&self, email: &str) -> Result<Option<Profile>, AuthError> {
        let url = self.endpoint_url("/rest/v1/profiles")?;
        let filter = format!("eq.{email}");

        debug!("profile lookup");

        let response = self
            .client
            .get(url)
            .query(&[("select", "id,email"), ("email", filter.as_str()), ("limit", "1")])
            .header("apikey", self.anon_key.expose_secret())
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        let response = Self::expect_success(response).await?;
        let profiles: Vec<Profile> = response
            .json()
            .await
            .map_err(|err| AuthError::Parse(format!("Failed to decode profile rows: {err}")))?;

        Ok(profiles.into_iter().next())
    }

    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &AccountMetadata,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError> {
        let mut url = self.endpoint_url("/auth/v1/signup")?;
        if let Some(target) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", target);
        }

        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
            "data": {
                "full_name": metadata.full_name,
            },
        });

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        Self::expect_success(response).await?;

        Ok(())
    }

    async fn issue_passcode(&self, email: &str, redirect_to: Option<&str>) -> Result<(), AuthError> {
        let mut url = self.endpoint_url("/auth/v1/otp")?;
        if let Some(target) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", target);
        }

        // The account already exists at this point; never create one here.
        let payload = json!({
            "email": email,
            "create_user": false,
        });

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        Self::expect_success(response).await?;

        Ok(())
    }

    async fn verify_passcode(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let url = self.endpoint_url("/auth/v1/verify")?;

        let payload = json!({
            "type": "signup",
            "email": email,
            "token": code,
        });

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        Self::expect_success(response).await?;

        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, AuthError> {
        let mut url = self.endpoint_url("/auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let payload = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        let response = Self::expect_success(response).await?;
        let session: Session = response
            .json()
            .await
            .map_err(|err| AuthError::Parse(format!("Failed to decode session: {err}")))?;

        self.store_session(&session).await;

        Ok(session)
    }

    async fn restore_session(&self) -> Result<Option<Session>, AuthError> {
        let refresh_token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.refresh_token.clone());

        let Some(refresh_token) = refresh_token else {
            return Ok(None);
        };

        let mut url = self.endpoint_url("/auth/v1/token")?;
        url.query_pairs_mut()
            .append_pair("grant_type", "refresh_token");

        let payload = json!({
            "refresh_token": refresh_token,
        });

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(AuthError::from_reqwest)?;

        let response = Self::expect_success(response).await?;
        let session: Session = response
            .json()
            .await
            .map_err(|err| AuthError::Parse(format!("Failed to decode session: {err}")))?;

        self.store_session(&session).await;

        Ok(Some(session))
    }
}
