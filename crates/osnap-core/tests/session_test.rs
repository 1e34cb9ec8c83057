mod common;

use common::{MockDriver, MockElement, MockInput, MockNotifier};
use osnap_core::{
    run_session, Credentials, Descriptor, Driver, MfaOptions, SessionConfig,
};
use std::time::Duration;

fn fast_config() -> SessionConfig {
    SessionConfig {
        portal_url: "https://portal.example.com/rooster".into(),
        destination_fragment: "rooster".into(),
        identifier_timeout: Duration::from_millis(150),
        credential_timeout: Duration::from_millis(150),
        credential_recheck_timeout: Duration::from_millis(100),
        click_timeout: Duration::from_millis(100),
        stay_signed_in_timeout: Duration::from_millis(60),
        destination_timeout: Duration::from_millis(150),
        poll_interval: Duration::from_millis(10),
        retries: 2,
        mfa: MfaOptions {
            detect_timeout: Duration::from_millis(80),
            alternatives_timeout: Duration::from_millis(40),
            select_timeout: Duration::from_millis(40),
            code_field_timeout: Duration::from_millis(120),
            resend_timeout: Duration::from_millis(40),
            confirm_timeout: Duration::from_millis(40),
            poll_interval: Duration::from_millis(10),
            retries: 2,
        },
    }
}

fn credentials() -> Credentials {
    Credentials {
        identifier: "user@example.com".into(),
        secret: "pw123".into(),
    }
}

fn login_page() -> Vec<MockElement> {
    vec![
        MockElement::new(Descriptor::name("loginfmt")),
        MockElement::new(Descriptor::id("idSIButton9")),
        MockElement::new(Descriptor::name("passwd")),
        MockElement::new(Descriptor::id("submitButton")),
    ]
}

#[tokio::test]
async fn full_login_without_mfa() {
    let mut driver = MockDriver::new(login_page());
    let notifier = MockNotifier::default();
    let mut input = MockInput::default();

    let result = run_session(
        &mut driver,
        &fast_config(),
        &credentials(),
        &notifier,
        &mut input,
    )
    .await;
    // Teardown is the caller's job on every exit path.
    driver.quit().await.unwrap();

    result.expect("login flow completes");
    assert!(driver.quit_called);
    assert!(input.prompts.is_empty(), "MFA must not be entered");

    assert!(driver
        .fills
        .contains(&("name=loginfmt".to_string(), "user@example.com".to_string())));
    // Credential is entered twice, defensively.
    let credential_fills = driver
        .fills
        .iter()
        .filter(|(d, v)| d == "name=passwd" && v == "pw123")
        .count();
    assert_eq!(credential_fills, 2);

    // Final snapshot reached the notifier.
    let deliveries = notifier.deliveries.lock().unwrap();
    assert!(deliveries
        .iter()
        .any(|(_, content)| content.as_deref().is_some_and(|c| c.contains("final"))));
}

#[tokio::test]
async fn full_login_with_sms_challenge() {
    let mut page = login_page();
    page.push(MockElement::new(Descriptor::name("otc")));
    page.push(MockElement::new(Descriptor::id("idSubmit_SAOTCC_Continue")));
    let mut driver = MockDriver::new(page);
    let notifier = MockNotifier::default();
    let mut input = MockInput::with_responses(&["482913"]);

    run_session(
        &mut driver,
        &fast_config(),
        &credentials(),
        &notifier,
        &mut input,
    )
    .await
    .expect("login flow completes");

    assert_eq!(input.prompts.len(), 1);
    assert!(driver
        .fills
        .contains(&("name=otc".to_string(), "482913".to_string())));
}

#[tokio::test]
async fn credential_inside_iframe_is_found() {
    let top = vec![
        MockElement::new(Descriptor::name("loginfmt")),
        MockElement::new(Descriptor::id("idSIButton9")),
    ];
    // Password page renders the form inside an embedded frame; the sign-in
    // button lives in the same document as the field.
    let frame = vec![
        MockElement::new(Descriptor::name("passwd")),
        MockElement::new(Descriptor::id("submitButton")),
    ];
    let mut driver = MockDriver::with_frames(vec![top, frame]);
    let notifier = MockNotifier::default();
    let mut input = MockInput::default();

    run_session(
        &mut driver,
        &fast_config(),
        &credentials(),
        &notifier,
        &mut input,
    )
    .await
    .expect("login flow completes");

    let credential_fills = driver
        .fills
        .iter()
        .filter(|(d, _)| d == "name=passwd")
        .count();
    assert_eq!(credential_fills, 2);
    assert!(driver.clicks.contains(&"id=submitButton".to_string()));
}

#[tokio::test]
async fn destination_timeout_still_captures_final_snapshot() {
    let mut config = fast_config();
    // Nothing will ever match the destination signals.
    config.portal_url = "https://portal.example.com/login".into();
    config.destination_fragment = "schedule-loaded".into();

    let mut driver = MockDriver::new(login_page());
    let notifier = MockNotifier::default();
    let mut input = MockInput::default();

    run_session(&mut driver, &config, &credentials(), &notifier, &mut input)
        .await
        .expect("ambiguous load state is not a crash");

    let deliveries = notifier.deliveries.lock().unwrap();
    assert!(deliveries
        .iter()
        .any(|(_, content)| content.as_deref().is_some_and(|c| c.contains("final"))));
}

#[tokio::test]
async fn notifier_failure_never_aborts_the_run() {
    let mut driver = MockDriver::new(login_page());
    let notifier = MockNotifier::failing();
    let mut input = MockInput::default();

    run_session(
        &mut driver,
        &fast_config(),
        &credentials(),
        &notifier,
        &mut input,
    )
    .await
    .expect("observability must not become control flow");
    assert_eq!(notifier.delivery_count(), 0);
}

#[tokio::test]
async fn missing_identifier_field_is_fatal() {
    let mut driver = MockDriver::new(vec![]);
    let notifier = MockNotifier::default();
    let mut input = MockInput::default();

    let result = run_session(
        &mut driver,
        &fast_config(),
        &credentials(),
        &notifier,
        &mut input,
    )
    .await;
    assert!(result.is_err());
}
