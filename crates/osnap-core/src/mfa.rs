//! The SMS verification flow.
//!
//! A short state machine entered right after credential submission. Exactly
//! one challenge context exists per invocation; it lives in the local state
//! value and is gone when this function returns.
//!
//! Only the wait for the code-entry field is load-bearing: which affordances
//! exist on the challenge page varies per account and tenant configuration,
//! so method selection, resend and submit-confirmation all degrade
//! gracefully when their control is absent.

use crate::actuator::{act, try_act, ActOptions, Action};
use crate::driver::Driver;
use crate::error::FlowError;
use crate::locator::{resolve, ResolveOptions};
use crate::notify::{CodeInput, Snapshotter};
use crate::selectors;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct MfaOptions {
    /// Wait for any challenge marker before concluding no MFA is required.
    pub detect_timeout: Duration,
    /// Wait for the alternative-methods affordance (best-effort).
    pub alternatives_timeout: Duration,
    /// Wait for an SMS method tile (best-effort).
    pub select_timeout: Duration,
    /// Wait for the code-entry field. SMS delivery is asynchronous, so this
    /// is the long one, and the only fatal one.
    pub code_field_timeout: Duration,
    /// Wait for a resend control (best-effort).
    pub resend_timeout: Duration,
    /// Wait for a confirm/verify control (best-effort).
    pub confirm_timeout: Duration,
    pub poll_interval: Duration,
    pub retries: u32,
}

impl Default for MfaOptions {
    fn default() -> Self {
        Self {
            detect_timeout: Duration::from_secs(10),
            alternatives_timeout: Duration::from_secs(5),
            select_timeout: Duration::from_secs(6),
            code_field_timeout: Duration::from_secs(20),
            resend_timeout: Duration::from_secs(5),
            confirm_timeout: Duration::from_secs(8),
            poll_interval: Duration::from_millis(250),
            retries: 3,
        }
    }
}

/// How a controller invocation ended. Both terminals are non-errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MfaOutcome {
    /// A challenge was detected, a code was entered and submitted.
    Completed,
    /// No challenge marker appeared; the caller proceeds as if no challenge
    /// exists.
    NotRequired,
}

enum MfaState {
    Detecting,
    MethodSelection,
    AwaitingCode,
    CodeEntry { resent: bool },
    Submitting { code: String },
}

/// Drive an SMS one-time-code challenge to completion.
///
/// Terminates in [`MfaOutcome::NotRequired`] without ever invoking the input
/// source when no challenge marker appears within the detection budget. A
/// missing code-entry field after method selection is fatal and propagates
/// as [`FlowError::Timeout`]; the orchestrator downgrades that to a no-op.
pub async fn run_sms_challenge<D, I>(
    driver: &mut D,
    input: &mut I,
    snaps: &Snapshotter<'_>,
    opts: &MfaOptions,
) -> Result<MfaOutcome, FlowError>
where
    D: Driver + ?Sized,
    I: CodeInput + ?Sized,
{
    let mut state = MfaState::Detecting;
    loop {
        state = match state {
            MfaState::Detecting => {
                let markers = selectors::challenge_markers();
                let wait = ResolveOptions {
                    timeout: opts.detect_timeout,
                    poll_interval: opts.poll_interval,
                    search_frames: false,
                };
                match resolve(driver, &markers, &wait).await {
                    Ok(_) => {
                        info!("verification challenge detected");
                        snaps
                            .capture(driver, "mfa_detected", Some("Challenge screen detected"))
                            .await;
                        MfaState::MethodSelection
                    }
                    Err(FlowError::ElementNotFound { .. }) => {
                        info!("no challenge screen appeared, continuing without MFA");
                        return Ok(MfaOutcome::NotRequired);
                    }
                    Err(e) => return Err(e),
                }
            }

            MfaState::MethodSelection => {
                // Expand the method list if the page offers one.
                try_act(
                    driver,
                    &selectors::alternative_methods_link(),
                    &Action::Click,
                    &step_opts(opts, opts.alternatives_timeout),
                )
                .await;

                // Pick the SMS delivery option; if no variant is clickable
                // the code field may already be visible by default.
                if try_act(
                    driver,
                    &selectors::sms_method_options(),
                    &Action::Click,
                    &step_opts(opts, opts.select_timeout),
                )
                .await
                {
                    snaps
                        .capture(driver, "mfa_sms_selected", Some("SMS option selected"))
                        .await;
                } else {
                    debug!("no SMS method tile found, assuming code entry is already shown");
                }
                MfaState::AwaitingCode
            }

            MfaState::AwaitingCode => {
                let wait = ResolveOptions {
                    timeout: opts.code_field_timeout,
                    poll_interval: opts.poll_interval,
                    search_frames: false,
                };
                match resolve(driver, &selectors::code_field(), &wait).await {
                    Ok(_) => {
                        snaps
                            .capture(driver, "mfa_code_field", Some("Code field visible"))
                            .await;
                        MfaState::CodeEntry { resent: false }
                    }
                    Err(FlowError::ElementNotFound { .. }) => {
                        return Err(FlowError::Timeout {
                            operation: "sms code entry field".into(),
                        });
                    }
                    Err(e) => return Err(e),
                }
            }

            MfaState::CodeEntry { resent } => {
                let message = if resent {
                    "Enter the received SMS code: "
                } else {
                    "Enter the received SMS code (leave empty to resend): "
                };
                let code = input
                    .prompt(message)
                    .await
                    .map_err(|e| FlowError::Input(e.to_string()))?
                    .trim()
                    .to_string();

                if code.is_empty() && !resent {
                    info!("empty code entered, requesting a fresh one");
                    if try_act(
                        driver,
                        &selectors::resend_controls(),
                        &Action::Click,
                        &step_opts(opts, opts.resend_timeout),
                    )
                    .await
                    {
                        snaps
                            .capture(driver, "mfa_resend", Some("Resend requested"))
                            .await;
                    }
                    // At most one resend per invocation; the next response is
                    // used as-is.
                    MfaState::CodeEntry { resent: true }
                } else {
                    MfaState::Submitting { code }
                }
            }

            MfaState::Submitting { code } => {
                act(
                    driver,
                    &selectors::code_field(),
                    &Action::Fill(code),
                    &step_opts(opts, opts.code_field_timeout),
                )
                .await?;
                snaps
                    .capture(driver, "mfa_code_entered", Some("Code entered"))
                    .await;

                // Some variants auto-advance on input, so a missing confirm
                // control is not a failure.
                if try_act(
                    driver,
                    &selectors::confirm_controls(),
                    &Action::Click,
                    &step_opts(opts, opts.confirm_timeout),
                )
                .await
                {
                    snaps
                        .capture(driver, "mfa_submitted", Some("Verification submitted"))
                        .await;
                }
                return Ok(MfaOutcome::Completed);
            }
        };
    }
}

fn step_opts(opts: &MfaOptions, timeout: Duration) -> ActOptions {
    ActOptions {
        timeout,
        retries: opts.retries,
        poll_interval: opts.poll_interval,
        search_frames: false,
    }
}
