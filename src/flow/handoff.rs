//! Session handoff: the last stage of the flow. Every outcome resolves to a
//! client-side route plus navigation state. The email and message ride in
//! navigation state, not in the URL, so nothing credentials-adjacent shows up
//! in history or server logs.

/// Message shown on the login page after a successful verification.
pub const ACCOUNT_VERIFIED_MESSAGE: &str = "Account verified successfully. Please login.";

/// Message shown when the email already has an account.
pub const DUPLICATE_ACCOUNT_MESSAGE: &str =
    "An account with this email already exists. Please login or use a different email.";

/// Client-side routes the flow can land on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Signup,
    Login,
    Dashboard,
}

impl Route {
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Route::Signup => "/signup",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }
}

/// Data passed alongside a route change, never encoded in the URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub email: Option<String>,
    pub message: Option<String>,
}

/// A resolved navigation: where to go and what to carry along.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub state: NavigationState,
}

/// Result of a flow stage, driving navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub success: bool,
    pub redirect: Route,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl SessionOutcome {
    /// The account was verified; send the user to login with a success note.
    #[must_use]
    pub fn verified(email: &str) -> Self {
        Self {
            success: true,
            redirect: Route::Login,
            email: Some(email.to_string()),
            message: Some(ACCOUNT_VERIFIED_MESSAGE.to_string()),
        }
    }

    /// The email already has an account; send the user to login pre-filled.
    #[must_use]
    pub fn duplicate(email: &str) -> Self {
        Self {
            success: false,
            redirect: Route::Login,
            email: Some(email.to_string()),
            message: Some(DUPLICATE_ACCOUNT_MESSAGE.to_string()),
        }
    }

    /// Login succeeded; enter the authenticated landing area.
    #[must_use]
    pub fn signed_in() -> Self {
        Self {
            success: true,
            redirect: Route::Dashboard,
            email: None,
            message: None,
        }
    }
}

/// Resolve an outcome into a navigation target.
#[must_use]
pub fn navigate(outcome: &SessionOutcome) -> Navigation {
    Navigation {
        route: outcome.redirect,
        state: NavigationState {
            email: outcome.email.clone(),
            message: outcome.message.clone(),
        },
    }
}
