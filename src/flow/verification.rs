//! Passcode verification controller. On entry it asks the provider to email a
//! one-time passcode and starts a 180-second countdown; the user can then
//! submit the code, or request a resend once the countdown has run out. The
//! provider remains authoritative for expiry; the local countdown is a UX
//! approximation that gates obviously stale submissions client-side.

use crate::{
    errors::{AuthError, Field, FieldError},
    flow::handoff::SessionOutcome,
    provider::IdentityProvider,
    validate,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant};
use tracing::debug;

/// Passcodes stay valid locally for this long.
pub const CODE_TTL_SECS: u64 = 180;

/// Message for codes that are not exactly six digits.
pub const INVALID_CODE_MESSAGE: &str = "Please enter a valid 6-digit verification code.";

/// Verification state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyState {
    /// A code is outstanding and the countdown is running.
    AwaitingCode,
    /// A submission is in flight with the provider.
    Verifying,
    /// The countdown ran out; submission is blocked until a resend.
    Expired,
    /// The provider confirmed the code; terminal success.
    Verified,
    /// The provider rejected the last submission.
    Failed,
}

/// Result of a resend request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResendOutcome {
    /// A new passcode was issued and the countdown restarted.
    Reissued,
    /// The current code is still live; no provider call was made.
    Throttled { remaining_secs: u64 },
}

/// Format remaining whole seconds as `M:SS` for display.
#[must_use]
pub fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// One-second repeating countdown scoped to the controller.
///
/// The ticker task republishes the remaining seconds every second through a
/// watch channel and is aborted when the countdown is dropped, so tearing the
/// controller down never leaves an orphaned timer behind.
struct Countdown {
    deadline: Instant,
    remaining: watch::Sender<u64>,
    ticker: JoinHandle<()>,
}

impl Countdown {
    fn start(total_secs: u64) -> Self {
        let deadline = Instant::now() + Duration::from_secs(total_secs);
        let (remaining, _) = watch::channel(total_secs);

        let sender = remaining.clone();
        let mut tick = interval_at(Instant::now() + Duration::from_secs(1), Duration::from_secs(1));
        let ticker = tokio::spawn(async move {
            loop {
                tick.tick().await;
                let left = deadline.saturating_duration_since(Instant::now()).as_secs();
                sender.send_replace(left);
                if left == 0 {
                    break;
                }
            }
        });

        Self {
            deadline,
            remaining,
            ticker,
        }
    }

    fn remaining_secs(&self) -> u64 {
        self.deadline
            .saturating_duration_since(Instant::now())
            .as_secs()
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.remaining.subscribe()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

/// Drives the passcode lifecycle for one email address.
pub struct VerificationCodeController<P: IdentityProvider> {
    provider: Arc<P>,
    email: String,
    state: VerifyState,
    countdown: Countdown,
}

impl<P: IdentityProvider> VerificationCodeController<P> {
    /// Issue a passcode for the email and start the countdown.
    ///
    /// Must run inside a Tokio runtime; the countdown ticker is spawned onto
    /// it and aborted when the controller is dropped.
    pub async fn start(provider: Arc<P>, email: String) -> Result<Self, AuthError> {
        provider.issue_passcode(&email, None).await?;
        debug!("passcode issued, countdown started");

        Ok(Self {
            provider,
            email,
            state: VerifyState::AwaitingCode,
            countdown: Countdown::start(CODE_TTL_SECS),
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Effective state: a stale countdown surfaces as `Expired`, and a
    /// rejected submission settles back into `AwaitingCode` while time
    /// remains.
    #[must_use]
    pub fn state(&self) -> VerifyState {
        match self.state {
            VerifyState::AwaitingCode | VerifyState::Failed
                if self.countdown.remaining_secs() == 0 =>
            {
                VerifyState::Expired
            }
            VerifyState::Failed => VerifyState::AwaitingCode,
            state => state,
        }
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    /// Countdown formatted as `M:SS` for display.
    #[must_use]
    pub fn remaining_display(&self) -> String {
        format_remaining(self.remaining_secs())
    }

    /// Observe the once-per-second countdown updates.
    #[must_use]
    pub fn subscribe_countdown(&self) -> watch::Receiver<u64> {
        self.countdown.subscribe()
    }

    /// Submit a passcode for verification.
    ///
    /// Codes that are not exactly six digits, and submissions after local
    /// expiry, are rejected without a provider call. A provider rejection is
    /// surfaced as-is and the machine returns to `AwaitingCode` while time
    /// remains, else `Expired`.
    pub async fn submit_code(&mut self, code: &str) -> Result<SessionOutcome, AuthError> {
        let code = code.trim();
        if !validate::valid_code(code) {
            return Err(AuthError::Validation(vec![FieldError::new(
                Field::Code,
                INVALID_CODE_MESSAGE,
            )]));
        }

        if self.state() == VerifyState::Expired {
            self.state = VerifyState::Expired;
            return Err(AuthError::ExpiredCode);
        }

        self.state = VerifyState::Verifying;
        match self.provider.verify_passcode(&self.email, code).await {
            Ok(()) => {
                self.state = VerifyState::Verified;
                Ok(SessionOutcome::verified(&self.email))
            }
            Err(err) => {
                // The provider verdict wins over the local clock.
                self.state = VerifyState::Failed;
                Err(err)
            }
        }
    }

    /// Request a fresh passcode.
    ///
    /// Only one code may be outstanding at a time: while the countdown is
    /// positive the request is rejected locally. At zero, exactly one new
    /// code is issued and the countdown resets.
    pub async fn resend(&mut self) -> Result<ResendOutcome, AuthError> {
        let remaining = self.countdown.remaining_secs();
        if remaining > 0 {
            return Ok(ResendOutcome::Throttled {
                remaining_secs: remaining,
            });
        }

        self.provider.issue_passcode(&self.email, None).await?;
        debug!("passcode reissued, countdown reset");

        self.countdown = Countdown::start(CODE_TTL_SECS);
        self.state = VerifyState::AwaitingCode;

        Ok(ResendOutcome::Reissued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::test_support::MockProvider;
    use tokio::time;

    async fn controller(provider: Arc<MockProvider>) -> VerificationCodeController<MockProvider> {
        VerificationCodeController::start(provider, "jane@example.com".to_string())
            .await
            .expect("issuance should succeed")
    }

    #[test]
    fn format_remaining_is_m_ss() {
        assert_eq!(format_remaining(180), "3:00");
        assert_eq!(format_remaining(65), "1:05");
        assert_eq!(format_remaining(60), "1:00");
        assert_eq!(format_remaining(9), "0:09");
        assert_eq!(format_remaining(0), "0:00");
    }

    #[tokio::test(start_paused = true)]
    async fn start_issues_one_passcode_and_counts_down_from_180() {
        let provider = Arc::new(MockProvider::default());
        let controller = controller(Arc::clone(&provider)).await;

        assert_eq!(provider.issue_count(), 1);
        assert_eq!(controller.state(), VerifyState::AwaitingCode);
        assert_eq!(controller.remaining_secs(), 180);
        assert_eq!(controller.remaining_display(), "3:00");

        time::advance(Duration::from_secs(30)).await;
        assert_eq!(controller.remaining_secs(), 150);
        assert_eq!(controller.remaining_display(), "2:30");

        time::advance(Duration::from_secs(115)).await;
        assert_eq!(controller.remaining_display(), "0:35");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_subscribers_see_ticks() {
        let provider = Arc::new(MockProvider::default());
        let controller = controller(provider).await;

        let mut receiver = controller.subscribe_countdown();
        assert_eq!(*receiver.borrow(), 180);

        time::advance(Duration::from_secs(1)).await;
        receiver.changed().await.expect("ticker alive");
        assert_eq!(*receiver.borrow_and_update(), 179);
    }

    #[tokio::test(start_paused = true)]
    async fn short_code_is_rejected_without_network_call() {
        let provider = Arc::new(MockProvider::default());
        let mut controller = controller(Arc::clone(&provider)).await;

        let result = controller.submit_code("123").await;
        match result {
            Err(AuthError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, Field::Code);
                assert_eq!(errors[0].message, INVALID_CODE_MESSAGE);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(provider.verify_count(), 0);
        assert_eq!(controller.state(), VerifyState::AwaitingCode);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_submission_is_rejected_without_network_call() {
        let provider = Arc::new(MockProvider::default());
        let mut controller = controller(Arc::clone(&provider)).await;

        time::advance(Duration::from_secs(CODE_TTL_SECS)).await;
        assert_eq!(controller.state(), VerifyState::Expired);
        assert_eq!(controller.remaining_display(), "0:00");

        let result = controller.submit_code("123456").await;
        assert_eq!(result, Err(AuthError::ExpiredCode));
        assert_eq!(provider.verify_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn correct_code_verifies_and_redirects_to_login() {
        let provider = Arc::new(MockProvider::default());
        let mut controller = controller(Arc::clone(&provider)).await;

        time::advance(Duration::from_secs(30)).await;
        let outcome = controller
            .submit_code("123456")
            .await
            .expect("verification should succeed");

        assert_eq!(provider.verify_count(), 1);
        assert_eq!(controller.state(), VerifyState::Verified);
        assert!(outcome.success);
        assert_eq!(outcome.email.as_deref(), Some("jane@example.com"));
        assert_eq!(
            outcome.message.as_deref(),
            Some(crate::flow::handoff::ACCOUNT_VERIFIED_MESSAGE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn provider_rejection_returns_to_awaiting_while_time_remains() {
        let provider = Arc::new(MockProvider {
            verify_error: Some(AuthError::Provider {
                status: 401,
                message: "Token has expired or is invalid".to_string(),
            }),
            ..MockProvider::default()
        });
        let mut controller = controller(Arc::clone(&provider)).await;

        let result = controller.submit_code("654321").await;
        assert!(result.is_err());
        assert_eq!(provider.verify_count(), 1);
        assert_eq!(controller.state(), VerifyState::AwaitingCode);

        time::advance(Duration::from_secs(CODE_TTL_SECS)).await;
        assert_eq!(controller.state(), VerifyState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn resend_is_throttled_while_countdown_is_positive() {
        let provider = Arc::new(MockProvider::default());
        let mut controller = controller(Arc::clone(&provider)).await;

        time::advance(Duration::from_secs(60)).await;
        let outcome = controller.resend().await.expect("throttle is not an error");
        assert_eq!(
            outcome,
            ResendOutcome::Throttled {
                remaining_secs: 120
            }
        );
        // Only the initial issuance went out.
        assert_eq!(provider.issue_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resend_at_zero_reissues_once_and_resets_countdown() {
        let provider = Arc::new(MockProvider::default());
        let mut controller = controller(Arc::clone(&provider)).await;

        time::advance(Duration::from_secs(CODE_TTL_SECS)).await;
        assert_eq!(controller.state(), VerifyState::Expired);

        let outcome = controller.resend().await.expect("resend should succeed");
        assert_eq!(outcome, ResendOutcome::Reissued);
        assert_eq!(provider.issue_count(), 2);
        assert_eq!(controller.state(), VerifyState::AwaitingCode);
        assert_eq!(controller.remaining_secs(), CODE_TTL_SECS);
        assert_eq!(controller.remaining_display(), "3:00");
    }

    #[tokio::test(start_paused = true)]
    async fn resend_failure_surfaces_provider_error() {
        let provider = Arc::new(MockProvider {
            issue_error: None,
            ..MockProvider::default()
        });
        let mut controller = controller(Arc::clone(&provider)).await;

        time::advance(Duration::from_secs(CODE_TTL_SECS)).await;

        // Swap in a failing provider for the reissue path.
        let failing = Arc::new(MockProvider {
            issue_error: Some(AuthError::Provider {
                status: 429,
                message: "over_email_send_rate_limit".to_string(),
            }),
            ..MockProvider::default()
        });
        controller.provider = Arc::clone(&failing);

        let result = controller.resend().await;
        assert!(matches!(
            result,
            Err(AuthError::Provider { status: 429, .. })
        ));
        // The countdown is only reset after a successful reissue.
        assert_eq!(controller.state(), VerifyState::Expired);
    }
}
