//! The session orchestrator: a linear login script with checkpoints.

use crate::actuator::{act, try_act, ActOptions, Action};
use crate::driver::Driver;
use crate::error::FlowError;
use crate::mfa::{run_sms_challenge, MfaOptions, MfaOutcome};
use crate::notify::{CodeInput, Notifier, Snapshotter};
use crate::selectors;
use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// Identifier and secret for the portal login. The secret never appears in
/// logs; `Debug` redacts it.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Portal entry URL; navigation target and start of the login redirect
    /// chain.
    pub portal_url: String,
    /// URL substring accepted as a destination-loaded signal.
    pub destination_fragment: String,
    /// Wait for the identifier field on the first login page. Fatal.
    pub identifier_timeout: Duration,
    /// Wait for the credential field (frame traversal enabled). Fatal.
    pub credential_timeout: Duration,
    /// Budget for the defensive second credential fill.
    pub credential_recheck_timeout: Duration,
    /// Budget for button clicks.
    pub click_timeout: Duration,
    /// Wait for the optional "remain signed in" prompt.
    pub stay_signed_in_timeout: Duration,
    /// Wait for any destination-loaded signal before snapshotting anyway.
    pub destination_timeout: Duration,
    pub poll_interval: Duration,
    pub retries: u32,
    pub mfa: MfaOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            portal_url: "https://mborijnland.osiris-student.nl/rooster".into(),
            destination_fragment: "rooster".into(),
            identifier_timeout: Duration::from_secs(20),
            credential_timeout: Duration::from_secs(20),
            credential_recheck_timeout: Duration::from_secs(10),
            click_timeout: Duration::from_secs(12),
            stay_signed_in_timeout: Duration::from_secs(8),
            destination_timeout: Duration::from_secs(25),
            poll_interval: Duration::from_millis(250),
            retries: 3,
            mfa: MfaOptions::default(),
        }
    }
}

impl SessionConfig {
    fn acts(&self, timeout: Duration) -> ActOptions {
        ActOptions {
            timeout,
            retries: self.retries,
            poll_interval: self.poll_interval,
            search_frames: false,
        }
    }
}

/// Run one full login from a blank session to a destination snapshot.
///
/// Every checkpoint emits a best-effort snapshot; notifier failures never
/// abort the run. The caller owns the driver and is responsible for
/// terminating it on every exit path, including an `Err` from here.
pub async fn run_session<D, I>(
    driver: &mut D,
    config: &SessionConfig,
    credentials: &Credentials,
    notifier: &dyn Notifier,
    input: &mut I,
) -> Result<(), FlowError>
where
    D: Driver + ?Sized,
    I: CodeInput + ?Sized,
{
    let snaps = Snapshotter::new(notifier);

    info!(url = %config.portal_url, "opening portal");
    driver.navigate(&config.portal_url).await?;
    snaps.capture(driver, "opened", Some("Page opened")).await;

    info!("entering identifier");
    act(
        driver,
        &selectors::identifier_field(),
        &Action::Fill(credentials.identifier.clone()),
        &config.acts(config.identifier_timeout),
    )
    .await?;
    snaps
        .capture(driver, "identifier_filled", Some("Identifier entered"))
        .await;

    act(
        driver,
        &selectors::next_button(),
        &Action::Click,
        &config.acts(config.click_timeout),
    )
    .await?;
    snaps
        .capture(driver, "after_identifier", Some("Next clicked"))
        .await;

    info!("entering credential");
    let credential_opts = config.acts(config.credential_timeout).search_frames(true);
    act(
        driver,
        &selectors::credential_field(),
        &Action::Fill(credentials.secret.clone()),
        &credential_opts,
    )
    .await?;
    snaps
        .capture(driver, "credential_filled", Some("Credential entered"))
        .await;

    // The original flow re-enters the credential right before submitting to
    // survive a client-side reset between page transitions. Preserved; not
    // assumed load-bearing.
    act(
        driver,
        &selectors::credential_field(),
        &Action::Fill(credentials.secret.clone()),
        &config
            .acts(config.credential_recheck_timeout)
            .search_frames(true),
    )
    .await?;

    act(
        driver,
        &selectors::credential_submit(),
        &Action::Click,
        &config.acts(config.click_timeout),
    )
    .await?;
    snaps
        .capture(driver, "after_credential", Some("Sign-in clicked"))
        .await;

    match run_sms_challenge(driver, input, &snaps, &config.mfa).await {
        Ok(MfaOutcome::Completed) => info!("challenge completed"),
        Ok(MfaOutcome::NotRequired) => info!("no challenge required"),
        // A timed-out challenge wait means the screen never appeared; treat
        // it the same as no challenge.
        Err(e) if e.is_timeout() => {
            info!(error = %e, "challenge screen not found, continuing");
        }
        Err(e) => return Err(e),
    }

    info!("checking for the remain-signed-in prompt");
    if try_act(
        driver,
        &selectors::next_button(),
        &Action::Click,
        &config.acts(config.stay_signed_in_timeout),
    )
    .await
    {
        snaps
            .capture(driver, "stay_signed_in", Some("Prompt confirmed"))
            .await;
    } else {
        info!("no remain-signed-in prompt, continuing");
    }

    info!("waiting for destination content");
    if !wait_for_destination(driver, config).await {
        warn!(
            timeout = ?config.destination_timeout,
            "destination signal never appeared, capturing final state anyway"
        );
    }
    snaps
        .capture(driver, "final", Some("Destination loaded or final state"))
        .await;

    Ok(())
}

/// Poll for any signal that the destination content has loaded: a known
/// content region, a generic table, or the destination URL fragment.
/// Returns whether a signal appeared; exhausting the budget is not an error.
async fn wait_for_destination<D>(driver: &mut D, config: &SessionConfig) -> bool
where
    D: Driver + ?Sized,
{
    let markers = selectors::destination_markers();
    let deadline = Instant::now() + config.destination_timeout;
    loop {
        for descriptor in markers.iter() {
            if driver.find(descriptor).await.is_ok() {
                return true;
            }
        }
        if let Ok(url) = driver.current_url().await {
            if url.contains(&config.destination_fragment) {
                return true;
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(config.poll_interval.min(deadline - now)).await;
    }
}
