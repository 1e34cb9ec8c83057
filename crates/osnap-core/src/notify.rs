//! Collaborator contracts: the notification endpoint and the human input
//! source, plus the snapshot helper that glues the driver to the notifier.

use crate::driver::Driver;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Best-effort delivery of a diagnostic message, optionally with a file.
///
/// Implementations must delete a transmitted file afterward. The core never
/// retries delivery and never lets a delivery failure abort the run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, file: Option<&Path>, content: Option<&str>) -> Result<(), NotifyError>;
}

#[derive(thiserror::Error, Debug)]
#[error("input source failed: {0}")]
pub struct InputError(pub String);

/// A blocking prompt that returns a one-time code from a human.
///
/// This is a genuine suspension point: the whole flow yields here until the
/// human responds. Invoked at most twice per run (initial entry plus one
/// resend retry).
#[async_trait]
pub trait CodeInput: Send {
    async fn prompt(&mut self, message: &str) -> Result<String, InputError>;
}

/// Captures viewport screenshots and forwards them to the notifier.
///
/// Everything in here is observability, not control flow: every failure is
/// logged at warn level and swallowed.
pub struct Snapshotter<'a> {
    notifier: &'a dyn Notifier,
}

impl<'a> Snapshotter<'a> {
    pub fn new(notifier: &'a dyn Notifier) -> Self {
        Self { notifier }
    }

    /// Screenshot the current viewport, stage it as a temp file and relay it
    /// with a caption. Best-effort.
    pub async fn capture<D>(&self, driver: &mut D, name: &str, note: Option<&str>)
    where
        D: Driver + ?Sized,
    {
        let bytes = match driver.screenshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(name, error = %e, "screenshot failed, checkpoint skipped");
                return;
            }
        };

        let path = staging_path(name);
        if let Err(e) = std::fs::write(&path, &bytes) {
            warn!(name, error = %e, "could not stage screenshot");
            return;
        }

        let mut caption = format!("Screenshot: {name}");
        if let Some(note) = note {
            caption.push('\n');
            caption.push_str(note);
        }

        if let Err(e) = self.notifier.notify(Some(&path), Some(&caption)).await {
            warn!(name, error = %e, "notifier delivery failed");
            // The notifier deletes the file on its own paths; make sure a
            // failed delivery does not leave the staging file behind.
            let _ = std::fs::remove_file(&path);
        }
    }
}

fn staging_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("osnap-{name}-{}-{stamp}.png", std::process::id()))
}
