//! fantoccini-backed implementation of the [`Driver`] contract.

use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use osnap_core::{Descriptor, Driver, DriverError, ElementHandle};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};

/// One exclusive WebDriver browsing session.
///
/// Element lookups mint opaque handles backed by fantoccini element
/// references; a handle whose element left the DOM surfaces as
/// [`DriverError::Stale`] on the next action.
pub struct WebDriverSession {
    client: Option<Client>,
    handles: HashMap<u64, fantoccini::elements::Element>,
    next_handle: u64,
}

impl WebDriverSession {
    /// Connect to a WebDriver server and open a fresh headless-capable
    /// Chrome session with a fixed viewport.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self, DriverError> {
        let mut chrome_args = vec!["--no-sandbox".to_string()];
        if headless {
            chrome_args.push("--headless=new".to_string());
            chrome_args.push("--disable-gpu".to_string());
            chrome_args.push("--disable-dev-shm-usage".to_string());
        }
        chrome_args.push("--window-size=1920,1080".to_string());

        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": chrome_args }),
        );

        info!(url = webdriver_url, headless, "connecting to WebDriver");
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                DriverError::Session(format!("failed to connect to {webdriver_url}: {e}"))
            })?;

        Ok(Self {
            client: Some(client),
            handles: HashMap::new(),
            next_handle: 1,
        })
    }

    fn client(&self) -> Result<Client, DriverError> {
        self.client
            .clone()
            .ok_or_else(|| DriverError::Session("browser session already closed".into()))
    }

    fn element(&self, handle: ElementHandle) -> Result<fantoccini::elements::Element, DriverError> {
        self.handles.get(&handle.0).cloned().ok_or(DriverError::Stale)
    }

    fn store(&mut self, element: fantoccini::elements::Element) -> ElementHandle {
        let handle = ElementHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle.0, element);
        handle
    }
}

/// Classify a stringified WebDriver failure into the driver taxonomy.
fn map_cmd_error(e: fantoccini::error::CmdError) -> DriverError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("stale element") {
        DriverError::Stale
    } else if lower.contains("not interactable") || lower.contains("element not visible") {
        DriverError::NotInteractable(msg)
    } else {
        DriverError::Session(msg)
    }
}

fn is_not_found(e: &fantoccini::error::CmdError) -> bool {
    let lower = e.to_string().to_lowercase();
    lower.contains("no such element") || lower.contains("unable to locate element")
}

#[async_trait]
impl Driver for WebDriverSession {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        let client = self.client()?;
        info!(url, "navigating");
        client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn find(&mut self, descriptor: &Descriptor) -> Result<ElementHandle, DriverError> {
        let client = self.client()?;
        let found = match descriptor {
            Descriptor::Id(v) => client.find(Locator::Id(v)).await,
            Descriptor::Css(v) => client.find(Locator::Css(v)).await,
            Descriptor::XPath(v) => client.find(Locator::XPath(v)).await,
            Descriptor::Name(v) => {
                let css = format!("[name='{v}']");
                client.find(Locator::Css(&css)).await
            }
            Descriptor::PartialLinkText(v) => {
                let xpath = format!("//a[contains(normalize-space(.), '{v}')]");
                client.find(Locator::XPath(&xpath)).await
            }
        };

        match found {
            Ok(element) => Ok(self.store(element)),
            Err(e) if is_not_found(&e) => Err(DriverError::not_found(descriptor)),
            Err(e) => Err(map_cmd_error(e)),
        }
    }

    async fn is_interactable(&mut self, handle: ElementHandle) -> Result<bool, DriverError> {
        let element = self.element(handle)?;
        let displayed = element.is_displayed().await.map_err(map_cmd_error)?;
        if !displayed {
            return Ok(false);
        }
        let enabled = element.is_enabled().await.map_err(map_cmd_error)?;
        Ok(enabled)
    }

    async fn click(&mut self, handle: ElementHandle) -> Result<(), DriverError> {
        let element = self.element(handle)?;
        element.click().await.map_err(map_cmd_error)
    }

    async fn clear(&mut self, handle: ElementHandle) -> Result<(), DriverError> {
        let element = self.element(handle)?;
        element.clear().await.map_err(map_cmd_error)
    }

    async fn type_text(&mut self, handle: ElementHandle, text: &str) -> Result<(), DriverError> {
        let element = self.element(handle)?;
        element.send_keys(text).await.map_err(map_cmd_error)
    }

    async fn frame_count(&mut self) -> Result<usize, DriverError> {
        let client = self.client()?;
        let frames = client
            .find_all(Locator::Css("iframe"))
            .await
            .map_err(map_cmd_error)?;
        Ok(frames.len())
    }

    async fn enter_frame(&mut self, index: usize) -> Result<(), DriverError> {
        let client = self.client()?;
        debug!(index, "entering iframe");
        client
            .enter_frame(Some(index as u16))
            .await
            .map_err(map_cmd_error)?;
        // References minted in another frame context are useless now.
        self.handles.clear();
        Ok(())
    }

    async fn enter_top_frame(&mut self) -> Result<(), DriverError> {
        let client = self.client()?;
        client.enter_frame(None).await.map_err(map_cmd_error)?;
        self.handles.clear();
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        let client = self.client()?;
        let url = client.current_url().await.map_err(map_cmd_error)?;
        Ok(url.to_string())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError> {
        let client = self.client()?;
        client.screenshot().await.map_err(map_cmd_error)
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        if let Some(client) = self.client.take() {
            info!("closing browser session");
            self.handles.clear();
            client
                .close()
                .await
                .map_err(|e| DriverError::Session(format!("failed to close session: {e}")))?;
        }
        Ok(())
    }
}
