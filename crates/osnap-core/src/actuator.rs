//! Resilient element actions.
//!
//! A live identity-provider page re-renders while the user-agent script runs:
//! elements detach and reattach between lookup and action. Bounded retry
//! absorbs that without masking genuine unavailability.

use crate::descriptor::CandidateSet;
use crate::driver::{Driver, DriverError};
use crate::error::FlowError;
use crate::locator::{resolve_interactable, ResolveOptions};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);
const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// What to do with the element once it is interactable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Click,
    /// Clear existing content, then type.
    Fill(String),
}

#[derive(Debug, Clone)]
pub struct ActOptions {
    /// Wait budget per attempt for the target to become interactable.
    pub timeout: Duration,
    pub retries: u32,
    pub poll_interval: Duration,
    pub search_frames: bool,
}

impl Default for ActOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            search_frames: false,
        }
    }
}

impl ActOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn search_frames(mut self, enabled: bool) -> Self {
        self.search_frames = enabled;
        self
    }
}

/// Wait for the first interactable candidate and act on it, retrying up to
/// `opts.retries` times.
///
/// Only two failure classes are retryable: the element went stale between
/// lookup and action, and the interactable-wait exhausting its budget.
/// Anything else propagates immediately. Exhausting retries fails with
/// [`FlowError::ActionFailed`] carrying the last cause.
pub async fn act<D>(
    driver: &mut D,
    candidates: &CandidateSet,
    action: &Action,
    opts: &ActOptions,
) -> Result<(), FlowError>
where
    D: Driver + ?Sized,
{
    let resolve_opts = ResolveOptions {
        timeout: opts.timeout,
        poll_interval: opts.poll_interval,
        search_frames: opts.search_frames,
    };

    let mut last_cause = DriverError::NotFound {
        descriptor: candidates.to_string(),
    };
    for attempt in 1..=opts.retries.max(1) {
        if attempt > 1 {
            warn!(
                attempt,
                candidates = %candidates,
                last_cause = %last_cause,
                "retrying action"
            );
        }

        let handle = match resolve_interactable(driver, candidates, &resolve_opts).await {
            Ok(handle) => handle,
            Err(FlowError::ElementNotFound { .. }) => {
                // The wait timed out; retryable.
                last_cause = DriverError::NotFound {
                    descriptor: candidates.to_string(),
                };
                continue;
            }
            Err(e) => return Err(e),
        };

        let outcome = match action {
            Action::Click => driver.click(handle).await,
            Action::Fill(text) => match driver.clear(handle).await {
                Ok(()) => driver.type_text(handle, text).await,
                Err(e) => Err(e),
            },
        };

        match outcome {
            Ok(()) => return Ok(()),
            Err(DriverError::Stale) => {
                last_cause = DriverError::Stale;
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(FlowError::ActionFailed {
        descriptor: candidates.to_string(),
        source: last_cause,
    })
}

/// Best-effort variant of [`act`]: swallows every failure and reports whether
/// the action landed.
///
/// The exact affordances present on a challenge page vary per tenant, so the
/// callers' happy paths stay legible by funnelling every optional step
/// through this.
pub async fn try_act<D>(
    driver: &mut D,
    candidates: &CandidateSet,
    action: &Action,
    opts: &ActOptions,
) -> bool
where
    D: Driver + ?Sized,
{
    match act(driver, candidates, action, opts).await {
        Ok(()) => true,
        Err(e) => {
            debug!(candidates = %candidates, error = %e, "optional action skipped");
            false
        }
    }
}
