//! Catalog of known descriptor variants for the portal's login pages.
//!
//! The identity provider renders the same logical control with different
//! attributes depending on tenant configuration, account type and rollout
//! cohort; each function returns the known variants in preference order.

use crate::descriptor::{CandidateSet, Descriptor};

/// The identifier (e-mail) field on the first login page.
pub fn identifier_field() -> CandidateSet {
    CandidateSet::single(Descriptor::name("loginfmt"))
}

/// The next/confirm button shared by several login pages, including the
/// "remain signed in" prompt.
pub fn next_button() -> CandidateSet {
    CandidateSet::single(Descriptor::id("idSIButton9"))
}

/// The password field, across page variants. May live inside an iframe.
pub fn credential_field() -> CandidateSet {
    CandidateSet::new(vec![
        Descriptor::name("passwd"),
        Descriptor::id("i0118"),
        Descriptor::css("input[type='password']"),
    ])
}

/// The sign-in submit button on the password page.
pub fn credential_submit() -> CandidateSet {
    CandidateSet::single(Descriptor::id("submitButton"))
}

/// Affordance that expands the list of alternative verification methods.
pub fn alternative_methods_link() -> CandidateSet {
    CandidateSet::single(Descriptor::partial_link_text("Outlook-app"))
}

/// The SMS delivery option, across challenge-page variants.
pub fn sms_method_options() -> CandidateSet {
    CandidateSet::new(vec![
        Descriptor::xpath("//div[@data-value='OneWaySMS']"),
        Descriptor::xpath("//span[@data-value='OneWaySMS']"),
        Descriptor::xpath("//div[contains(@data-bind,'data-value') and contains(., 'SMS')]"),
        Descriptor::xpath(
            "//div[contains(@class,'table') and .//span[contains(@data-value,'OneWaySMS')]]",
        ),
    ])
}

/// The one-time-code entry field, across challenge-page variants.
pub fn code_field() -> CandidateSet {
    CandidateSet::new(vec![
        Descriptor::name("otc"),
        Descriptor::id("idTxtBx_SAOTCC"),
        Descriptor::css("input[type='tel']"),
    ])
}

/// Controls that request a fresh code, across variants and languages.
pub fn resend_controls() -> CandidateSet {
    CandidateSet::new(vec![
        Descriptor::id("resendCode"),
        Descriptor::xpath(
            "//a[contains(., 'Opnieuw') or contains(., 'Nogmaals') or contains(., 'Resend') or contains(., 'Erneut')]",
        ),
        Descriptor::xpath(
            "//button[contains(., 'Opnieuw') or contains(., 'Nogmaals') or contains(., 'Resend') or contains(., 'Erneut')]",
        ),
    ])
}

/// Confirm/verify controls on the code-entry page, across variants.
pub fn confirm_controls() -> CandidateSet {
    CandidateSet::new(vec![
        Descriptor::id("idSubmit_SAOTCC_Continue"),
        Descriptor::id("idSubmit_ProofUp_Redirect"),
        Descriptor::css("input[type='submit']"),
        Descriptor::xpath(
            "//button[contains(., 'Verifi') or contains(., 'Verify') or contains(., 'Doorgaan') or contains(., 'Weiter')]",
        ),
    ])
}

/// Anything that signals a live SMS challenge: a code field, an SMS method
/// tile, or the alternative-methods affordance. Used only for detection.
pub fn challenge_markers() -> CandidateSet {
    code_field()
        .chain(sms_method_options())
        .chain(alternative_methods_link())
}

/// Signals that the destination content has loaded.
pub fn destination_markers() -> CandidateSet {
    CandidateSet::new(vec![
        Descriptor::css("[data-testid='rooster'], .rooster, #rooster"),
        Descriptor::css("table"),
    ])
}
