//! Scripted in-memory collaborators for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use osnap_core::{
    CodeInput, Descriptor, Driver, DriverError, ElementHandle, InputError, Notifier, NotifyError,
};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;

/// One scripted element in a mock page.
#[derive(Debug, Clone)]
pub struct MockElement {
    pub descriptor: Descriptor,
    /// Number of `find` calls for this descriptor (in this frame) that miss
    /// before the element appears.
    pub appears_after_finds: u32,
    /// Number of actions (click/clear/type) that raise `Stale` before the
    /// element behaves.
    pub stale_actions: u32,
    pub interactable: bool,
    /// Hard failure returned by every action on this element (non-retryable
    /// from the actuator's point of view).
    pub action_error: Option<DriverError>,
}

impl MockElement {
    pub fn new(descriptor: Descriptor) -> Self {
        Self {
            descriptor,
            appears_after_finds: 0,
            stale_actions: 0,
            interactable: true,
            action_error: None,
        }
    }

    pub fn appears_after(mut self, finds: u32) -> Self {
        self.appears_after_finds = finds;
        self
    }

    pub fn stale_for(mut self, actions: u32) -> Self {
        self.stale_actions = actions;
        self
    }

    pub fn not_interactable(mut self) -> Self {
        self.interactable = false;
        self
    }

    pub fn action_fails_with(mut self, error: DriverError) -> Self {
        self.action_error = Some(error);
        self
    }
}

/// Scripted driver: frame 0 is the top-level document, frame `i + 1` holds
/// the contents of iframe `i`. Records every click and fill.
pub struct MockDriver {
    frames: Vec<Vec<MockElement>>,
    current_frame: usize,
    pub url: String,
    find_counts: HashMap<(usize, String), u32>,
    handles: HashMap<u64, (usize, usize)>,
    next_handle: u64,
    stale_remaining: HashMap<(usize, usize), u32>,
    pub clicks: Vec<String>,
    pub fills: Vec<(String, String)>,
    pub screenshots: u32,
    pub quit_called: bool,
}

impl MockDriver {
    pub fn new(top: Vec<MockElement>) -> Self {
        Self::with_frames(vec![top])
    }

    /// `frames[0]` is the top document; each further entry is one iframe in
    /// document order.
    pub fn with_frames(frames: Vec<Vec<MockElement>>) -> Self {
        let mut stale_remaining = HashMap::new();
        for (f, elements) in frames.iter().enumerate() {
            for (i, element) in elements.iter().enumerate() {
                if element.stale_actions > 0 {
                    stale_remaining.insert((f, i), element.stale_actions);
                }
            }
        }
        Self {
            frames,
            current_frame: 0,
            url: "https://login.example.com/".into(),
            find_counts: HashMap::new(),
            handles: HashMap::new(),
            next_handle: 1,
            stale_remaining,
            clicks: Vec::new(),
            fills: Vec::new(),
            screenshots: 0,
            quit_called: false,
        }
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    fn lookup(&self, handle: ElementHandle) -> Result<(usize, usize), DriverError> {
        self.handles
            .get(&handle.0)
            .copied()
            .ok_or(DriverError::Stale)
    }

    /// Consumes one staleness charge if any remain for this element.
    fn charge_stale(&mut self, key: (usize, usize)) -> Result<(), DriverError> {
        if let Some(remaining) = self.stale_remaining.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DriverError::Stale);
            }
        }
        Ok(())
    }

    fn element(&self, key: (usize, usize)) -> &MockElement {
        &self.frames[key.0][key.1]
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.url = url.to_string();
        self.current_frame = 0;
        Ok(())
    }

    async fn find(&mut self, descriptor: &Descriptor) -> Result<ElementHandle, DriverError> {
        let key = (self.current_frame, descriptor.to_string());
        let count = self.find_counts.entry(key).or_insert(0);
        *count += 1;
        let seen = *count;

        let position = self.frames[self.current_frame]
            .iter()
            .position(|e| &e.descriptor == descriptor && seen > e.appears_after_finds);
        match position {
            Some(index) => {
                let handle = ElementHandle(self.next_handle);
                self.next_handle += 1;
                self.handles.insert(handle.0, (self.current_frame, index));
                Ok(handle)
            }
            None => Err(DriverError::not_found(descriptor)),
        }
    }

    async fn is_interactable(&mut self, handle: ElementHandle) -> Result<bool, DriverError> {
        let key = self.lookup(handle)?;
        Ok(self.element(key).interactable)
    }

    async fn click(&mut self, handle: ElementHandle) -> Result<(), DriverError> {
        let key = self.lookup(handle)?;
        self.charge_stale(key)?;
        if let Some(error) = self.element(key).action_error.clone() {
            return Err(error);
        }
        let descriptor = self.element(key).descriptor.to_string();
        self.clicks.push(descriptor);
        Ok(())
    }

    async fn clear(&mut self, handle: ElementHandle) -> Result<(), DriverError> {
        let key = self.lookup(handle)?;
        self.charge_stale(key)?;
        Ok(())
    }

    async fn type_text(&mut self, handle: ElementHandle, text: &str) -> Result<(), DriverError> {
        let key = self.lookup(handle)?;
        self.charge_stale(key)?;
        let descriptor = self.element(key).descriptor.to_string();
        self.fills.push((descriptor, text.to_string()));
        Ok(())
    }

    async fn frame_count(&mut self) -> Result<usize, DriverError> {
        Ok(self.frames.len() - 1)
    }

    async fn enter_frame(&mut self, index: usize) -> Result<(), DriverError> {
        if index + 1 >= self.frames.len() {
            return Err(DriverError::Session(format!("no frame at index {index}")));
        }
        self.current_frame = index + 1;
        Ok(())
    }

    async fn enter_top_frame(&mut self) -> Result<(), DriverError> {
        self.current_frame = 0;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.url.clone())
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, DriverError> {
        self.screenshots += 1;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn quit(&mut self) -> Result<(), DriverError> {
        self.quit_called = true;
        Ok(())
    }
}

/// Recording notifier; optionally fails every delivery.
#[derive(Default)]
pub struct MockNotifier {
    pub deliveries: Mutex<Vec<(Option<String>, Option<String>)>>,
    pub fail: bool,
}

impl MockNotifier {
    pub fn failing() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, file: Option<&Path>, content: Option<&str>) -> Result<(), NotifyError> {
        if let Some(path) = file {
            let _ = std::fs::remove_file(path);
        }
        if self.fail {
            return Err(NotifyError::Delivery("mock endpoint down".into()));
        }
        self.deliveries.lock().unwrap().push((
            file.map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned()),
            content.map(str::to_string),
        ));
        Ok(())
    }
}

/// Scripted human input source; records every prompt it receives.
#[derive(Default)]
pub struct MockInput {
    pub responses: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl MockInput {
    pub fn with_responses(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|s| s.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

#[async_trait]
impl CodeInput for MockInput {
    async fn prompt(&mut self, message: &str) -> Result<String, InputError> {
        self.prompts.push(message.to_string());
        self.responses
            .pop_front()
            .ok_or_else(|| InputError("no scripted response left".into()))
    }
}
