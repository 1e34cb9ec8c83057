//! The browser driver contract.
//!
//! The interaction core never talks to a browser directly; it drives this
//! trait. The production implementation lives in `osnap-webdriver`, tests
//! use scripted mocks.

use crate::descriptor::Descriptor;
use async_trait::async_trait;

/// Opaque reference to an element previously found by the driver.
///
/// A handle stays valid only as long as the underlying element remains
/// attached to the DOM; acting on a detached one yields [`DriverError::Stale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

#[derive(thiserror::Error, Debug, Clone)]
pub enum DriverError {
    #[error("no element matches {descriptor}")]
    NotFound { descriptor: String },

    #[error("element reference is stale (removed from DOM)")]
    Stale,

    #[error("element is not interactable: {0}")]
    NotInteractable(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("browser session error: {0}")]
    Session(String),
}

/// Minimal surface the interaction core needs from a live browsing context.
///
/// Mirrors one exclusive browser session: methods take `&mut self` because a
/// session must have a single driver for the lifetime of a run.
#[async_trait]
pub trait Driver: Send {
    /// Navigate the session to a URL.
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Find the first element matching a descriptor in the current frame.
    /// Immediate lookup; waiting and retrying are the caller's concern.
    async fn find(&mut self, descriptor: &Descriptor) -> Result<ElementHandle, DriverError>;

    /// Whether the element is displayed and enabled.
    async fn is_interactable(&mut self, handle: ElementHandle) -> Result<bool, DriverError>;

    async fn click(&mut self, handle: ElementHandle) -> Result<(), DriverError>;

    async fn clear(&mut self, handle: ElementHandle) -> Result<(), DriverError>;

    async fn type_text(&mut self, handle: ElementHandle, text: &str) -> Result<(), DriverError>;

    /// Number of iframes in the current document, in document order.
    async fn frame_count(&mut self) -> Result<usize, DriverError>;

    /// Switch the session context into the iframe at `index`.
    async fn enter_frame(&mut self, index: usize) -> Result<(), DriverError>;

    /// Switch the session context back to the top-level document.
    async fn enter_top_frame(&mut self) -> Result<(), DriverError>;

    async fn current_url(&mut self) -> Result<String, DriverError>;

    /// Capture a PNG of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError>;

    /// Terminate the browser session. Idempotent.
    async fn quit(&mut self) -> Result<(), DriverError>;
}

impl DriverError {
    pub fn not_found(descriptor: &Descriptor) -> Self {
        DriverError::NotFound {
            descriptor: descriptor.to_string(),
        }
    }
}
