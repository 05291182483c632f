//! Runtime configuration for the provider boundary, read from `GLAM_*`
//! environment variables. Values are validated up front so a misconfigured
//! deployment fails at startup rather than mid-flow. The anon key is the
//! project's public API key; it is still kept out of logs.

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use std::env;
use url::Url;

pub const ENV_PROVIDER_URL: &str = "GLAM_PROVIDER_URL";
pub const ENV_ANON_KEY: &str = "GLAM_ANON_KEY";
pub const ENV_LOGIN_REDIRECT: &str = "GLAM_LOGIN_REDIRECT";

#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// Base URL of the hosted provider project.
    pub provider_url: Url,
    /// Public project API key sent as the `apikey` header.
    pub anon_key: SecretString,
    /// Where the provider should send the user after confirming, usually the
    /// login page. Omitted from requests when unset.
    pub login_redirect: Option<String>,
}

impl FlowConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let provider_url =
            env::var(ENV_PROVIDER_URL).with_context(|| format!("{ENV_PROVIDER_URL} is not set"))?;
        let provider_url = Url::parse(provider_url.trim())
            .with_context(|| format!("{ENV_PROVIDER_URL} is not a valid URL"))?;

        if !matches!(provider_url.scheme(), "http" | "https") {
            bail!(
                "{ENV_PROVIDER_URL}: unsupported scheme {}",
                provider_url.scheme()
            );
        }

        let anon_key =
            env::var(ENV_ANON_KEY).with_context(|| format!("{ENV_ANON_KEY} is not set"))?;
        let anon_key = anon_key.trim().to_string();
        if anon_key.is_empty() {
            bail!("{ENV_ANON_KEY} is empty");
        }

        let login_redirect = env::var(ENV_LOGIN_REDIRECT)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            provider_url,
            anon_key: SecretString::from(anon_key),
            login_redirect,
        })
    }
}
