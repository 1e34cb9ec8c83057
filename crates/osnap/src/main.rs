use clap::Parser as ClapParser;
use osnap_core::{run_session, Credentials, Driver, SessionConfig};
use osnap_webdriver::{chromedriver, DiscordNotifier, StdinCodeInput, WebDriverSession};
use tracing::{error, info, warn};

#[derive(ClapParser, Debug)]
#[command(author, version, about = "Portal login bot: signs in, screenshots, relays", long_about = None)]
struct Args {
    /// Portal entry URL
    #[arg(
        long,
        default_value = "https://mborijnland.osiris-student.nl/rooster",
        env = "OSNAP_URL"
    )]
    url: String,

    /// URL of an external WebDriver server. If not provided, chromedriver is
    /// launched automatically.
    #[arg(short, long)]
    webdriver_url: Option<String>,

    /// Port for the auto-launched chromedriver
    #[arg(long, default_value_t = chromedriver::DEFAULT_PORT)]
    port: u16,

    /// Run the browser with a visible window instead of headless
    #[arg(long)]
    headed: bool,

    /// Login identifier
    #[arg(long, env = "OSNAP_USER", hide_env_values = true)]
    user: String,

    /// Login secret
    #[arg(long, env = "OSNAP_PASS", hide_env_values = true)]
    pass: String,

    /// Webhook endpoint receiving the snapshots
    #[arg(long, env = "OSNAP_WEBHOOK", hide_env_values = true)]
    webhook: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Keep the process handle alive for the whole run; dropping it kills the
    // chromedriver child.
    let (webdriver_url, _chromedriver) = match &args.webdriver_url {
        Some(url) => {
            info!(url, "using external WebDriver");
            (url.clone(), None)
        }
        None => {
            let process = chromedriver::launch(args.port)
                .await
                .map_err(anyhow::Error::msg)?;
            (process.webdriver_url(), Some(process))
        }
    };

    let mut driver = WebDriverSession::connect(&webdriver_url, !args.headed).await?;

    let config = SessionConfig {
        portal_url: args.url.clone(),
        ..SessionConfig::default()
    };
    let credentials = Credentials {
        identifier: args.user.clone(),
        secret: args.pass.clone(),
    };
    let notifier = DiscordNotifier::new(args.webhook.clone());
    let mut input = StdinCodeInput::new();

    info!("starting login run");
    let outcome = run_session(&mut driver, &config, &credentials, &notifier, &mut input).await;

    // Terminate the browser on every exit path before surfacing the result.
    if let Err(e) = driver.quit().await {
        warn!(error = %e, "browser teardown failed");
    }

    match outcome {
        Ok(()) => {
            info!("run finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_args_parse_from_flags() {
        let args = Args::try_parse_from([
            "osnap",
            "--user",
            "user@example.com",
            "--pass",
            "pw123",
            "--webhook",
            "https://hooks.example.com/x",
        ])
        .unwrap();
        assert!(args.url.contains("rooster"));
        assert_eq!(args.port, chromedriver::DEFAULT_PORT);
        assert!(!args.headed);
    }

    #[test]
    fn missing_credentials_are_rejected() {
        // No flags and no OSNAP_* environment set by this test runner
        // invocation path.
        let result = Args::try_parse_from(["osnap", "--webhook", "https://hooks.example.com/x"]);
        assert!(result.is_err() || std::env::var("OSNAP_USER").is_ok());
    }
}
