//! The three-stage account flow: registration, passcode verification, and
//! session handoff. Each stage produces a [`handoff::SessionOutcome`] so the
//! embedding UI always has a route to take the user to, including on failure.

pub mod handoff;
pub mod login;
pub mod registration;
pub mod verification;

pub use handoff::{navigate, Navigation, NavigationState, Route, SessionOutcome};
pub use registration::{RegistrationRequest, RegistrationSubmitter, SubmitOutcome};
pub use verification::{ResendOutcome, VerificationCodeController, VerifyState};
