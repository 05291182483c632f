//! # GlamConnect Auth
//!
//! Account flow for the GlamConnect marketplace front-end: registration,
//! one-time-passcode (OTP) email verification, and the handoff into login.
//! All persistent identity state (accounts, credentials, confirmation flags)
//! lives in the hosted identity/data provider; this crate only holds the
//! transient state of one flow instance while it runs.
//!
//! ## Flow
//!
//! - [`flow::registration::RegistrationSubmitter`] validates the signup form
//!   locally, pre-checks the profile table for a duplicate email, and submits
//!   the new account to the provider.
//! - [`flow::verification::VerificationCodeController`] owns the passcode
//!   lifecycle: issuance on entry, a 180-second countdown, throttled resend,
//!   and code submission.
//! - [`flow::handoff`] turns each stage's [`flow::handoff::SessionOutcome`]
//!   into a navigation target; failure paths always land somewhere the user
//!   can recover from.
//!
//! ## Provider boundary
//!
//! The hosted service is reached through the [`provider::IdentityProvider`]
//! trait. The production implementation ([`provider::http::HostedProvider`])
//! talks to a Supabase-style auth API and table API over HTTPS; tests swap in
//! doubles. Passwords travel as [`secrecy::SecretString`] and are never
//! logged.

pub mod config;
pub mod errors;
pub mod flow;
pub mod provider;
pub mod session;
pub mod telemetry;
pub mod validate;

pub use config::FlowConfig;
pub use errors::{AuthError, Field, FieldError};
pub use flow::handoff::{Navigation, NavigationState, Route, SessionOutcome};
pub use provider::IdentityProvider;
pub use session::SessionContext;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
