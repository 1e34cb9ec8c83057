//! Multi-candidate element resolution with optional iframe traversal.

use crate::descriptor::CandidateSet;
use crate::driver::{Driver, DriverError, ElementHandle};
use crate::error::FlowError;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Budget per frame, not cumulative across frames.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Retry the full candidate set inside each iframe when the top-level
    /// document yields nothing.
    pub search_frames: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            search_frames: false,
        }
    }
}

impl ResolveOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn search_frames(mut self, enabled: bool) -> Self {
        self.search_frames = enabled;
        self
    }
}

/// Resolve the first candidate that becomes present in the live document.
///
/// Sweeps the candidate set in order on every poll tick, so an earlier
/// candidate wins whenever it is present, regardless of what else matches.
/// With `search_frames` enabled, a miss at the top level is followed by one
/// full attempt window per iframe in document order; on a cross-frame hit
/// the driver is left inside the matching frame, and the caller must not
/// assume top-level context.
pub async fn resolve<D>(
    driver: &mut D,
    candidates: &CandidateSet,
    opts: &ResolveOptions,
) -> Result<ElementHandle, FlowError>
where
    D: Driver + ?Sized,
{
    resolve_with(driver, candidates, opts, false).await
}

/// Like [`resolve`], but additionally waits until the found element is
/// displayed and enabled within the same budget.
pub async fn resolve_interactable<D>(
    driver: &mut D,
    candidates: &CandidateSet,
    opts: &ResolveOptions,
) -> Result<ElementHandle, FlowError>
where
    D: Driver + ?Sized,
{
    resolve_with(driver, candidates, opts, true).await
}

async fn resolve_with<D>(
    driver: &mut D,
    candidates: &CandidateSet,
    opts: &ResolveOptions,
    interactable: bool,
) -> Result<ElementHandle, FlowError>
where
    D: Driver + ?Sized,
{
    debug!(candidates = %candidates, "resolving");
    if let Some(handle) = resolve_in_frame(driver, candidates, opts, interactable).await? {
        return Ok(handle);
    }

    if opts.search_frames {
        let frames = driver.frame_count().await?;
        if frames > 0 {
            info!(
                frames,
                candidates = %candidates,
                "not found in top-level document, searching iframes"
            );
        }
        for index in 0..frames {
            driver.enter_top_frame().await?;
            driver.enter_frame(index).await?;
            if let Some(handle) = resolve_in_frame(driver, candidates, opts, interactable).await? {
                // Deliberately stay inside this frame; follow-up actions on
                // the resolved element need the same context.
                return Ok(handle);
            }
        }
        driver.enter_top_frame().await?;
    }

    Err(FlowError::ElementNotFound {
        candidates: candidates.to_string(),
    })
}

/// One attempt window over the candidate set in the current frame.
/// Always performs at least one full sweep, even with a zero budget.
async fn resolve_in_frame<D>(
    driver: &mut D,
    candidates: &CandidateSet,
    opts: &ResolveOptions,
    interactable: bool,
) -> Result<Option<ElementHandle>, FlowError>
where
    D: Driver + ?Sized,
{
    let deadline = Instant::now() + opts.timeout;
    loop {
        for descriptor in candidates.iter() {
            match driver.find(descriptor).await {
                Ok(handle) => {
                    if !interactable {
                        return Ok(Some(handle));
                    }
                    match driver.is_interactable(handle).await {
                        Ok(true) => return Ok(Some(handle)),
                        // Not ready yet, or detached between find and check;
                        // keep polling.
                        Ok(false) | Err(DriverError::Stale) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                // Keep sweeping the remaining candidates.
                Err(DriverError::NotFound { .. }) | Err(DriverError::Stale) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(opts.poll_interval.min(deadline - now)).await;
    }
}
