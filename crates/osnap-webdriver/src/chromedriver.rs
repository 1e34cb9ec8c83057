//! chromedriver process management.
//!
//! Spawns a local chromedriver, waits for its status endpoint to come up and
//! guarantees the child is reaped when the handle drops.

use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Standard chromedriver port.
pub const DEFAULT_PORT: u16 = 9515;

/// Common paths where chromedriver might be installed.
const CHROMEDRIVER_PATHS: &[&str] = &[
    "/usr/bin/chromedriver",
    "/usr/local/bin/chromedriver",
    "/usr/lib/chromium-browser/chromedriver",
    "/snap/bin/chromium.chromedriver",
];

/// Returns the default WebDriver URL for a local chromedriver instance.
pub fn default_url() -> String {
    format!("http://localhost:{DEFAULT_PORT}")
}

/// Find the chromedriver binary on the system.
pub fn find_chromedriver_binary() -> Option<String> {
    // First check PATH
    if let Ok(output) = Command::new("which").arg("chromedriver").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let path = path.trim();
                if !path.is_empty() {
                    return Some(path.to_string());
                }
            }
        }
    }

    // Check common paths
    for path in CHROMEDRIVER_PATHS {
        if std::path::Path::new(path).exists() {
            return Some(path.to_string());
        }
    }

    None
}

/// Handle to a running chromedriver process.
pub struct ChromedriverProcess {
    child: Child,
    port: u16,
}

impl ChromedriverProcess {
    /// Get the WebDriver URL for this instance.
    pub fn webdriver_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

impl Drop for ChromedriverProcess {
    fn drop(&mut self) {
        info!("shutting down chromedriver process");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Launch chromedriver on `port` and wait until it answers status probes.
pub async fn launch(port: u16) -> Result<ChromedriverProcess, String> {
    let binary = find_chromedriver_binary().ok_or_else(|| {
        "chromedriver not found. Install it (e.g. apt install chromium-driver) or pass \
         --webdriver-url for an already-running server."
            .to_string()
    })?;

    info!(binary, port, "launching chromedriver");
    let child = Command::new(&binary)
        .arg(format!("--port={port}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to launch chromedriver: {e}"))?;

    let url = format!("http://localhost:{port}/status");
    let client = reqwest::Client::new();

    let process = ChromedriverProcess { child, port };
    for attempt in 1..=30 {
        sleep(Duration::from_millis(200)).await;

        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!(attempt, "chromedriver ready");
                return Ok(process);
            }
            Ok(_) => {
                warn!(attempt, "chromedriver responded but is not ready yet");
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    info!(attempt, "waiting for chromedriver");
                }
            }
        }
    }

    // Dropping the handle kills the child.
    drop(process);
    Err("chromedriver did not become ready within timeout".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_uses_standard_port() {
        assert_eq!(default_url(), "http://localhost:9515");
    }

    #[test]
    fn binary_discovery_does_not_panic() {
        // Availability depends on the system; only exercise the probe.
        let _ = find_chromedriver_binary();
    }
}
