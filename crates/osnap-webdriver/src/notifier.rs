//! Webhook delivery of diagnostic snapshots.

use async_trait::async_trait;
use osnap_core::{Notifier, NotifyError};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::{debug, error};

/// Posts messages and screenshot files to a Discord-compatible webhook.
///
/// Delivery is best-effort by contract: the caller never retries. Any file
/// handed over is removed from disk after the attempt, successful or not.
pub struct DiscordNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }
}

fn file_part(path: &Path, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes).file_name(attachment_name(path))
}

/// Name the attachment after the staged file, with a safe fallback.
fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot.png".to_string())
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, file: Option<&Path>, content: Option<&str>) -> Result<(), NotifyError> {
        let mut form = Form::new();
        if let Some(content) = content {
            form = form.text("content", content.to_string());
        }
        if let Some(path) = file {
            let bytes = tokio::fs::read(path).await?;
            form = form.part("file", file_part(path, bytes));
        }

        let result = self
            .client
            .post(&self.webhook_url)
            .multipart(form)
            .send()
            .await;

        // The staged file is single-use; drop it whatever happened.
        if let Some(path) = file {
            let _ = std::fs::remove_file(path);
        }

        let response = result.map_err(|e| NotifyError::Delivery(e.to_string()))?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body, "webhook rejected delivery");
            return Err(NotifyError::Delivery(format!(
                "webhook returned {status}"
            )));
        }
        debug!(%status, "snapshot delivered");
        Ok(())
    }
}
