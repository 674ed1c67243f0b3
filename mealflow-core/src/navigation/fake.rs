//! Fake browser and notifier for testing.
//!
//! Both are cheap to clone; clones share their recorded history, so a test can
//! hand one copy to the code under test and inspect the other.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Browser, BrowserError, Notifier, Target, WindowHandle};

/// What `FakeBrowser::open` does.
#[derive(Debug, Clone)]
pub enum OpenBehavior {
    /// Returns a live handle.
    Open,
    /// Returns no handle, like a silently swallowed popup.
    NoHandle,
    /// Returns a handle that reports itself closed.
    Closed,
    /// Returns a handle whose closed state cannot be read.
    Unreadable,
    /// The open call itself fails.
    Error(String),
}

#[derive(Debug, Default)]
struct Recorded {
    opened: Vec<(String, String)>,
    navigations: Vec<String>,
    focus_count: usize,
    close_count: usize,
}

#[derive(Debug, Clone)]
pub struct FakeBrowser {
    behavior: OpenBehavior,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeBrowser {
    pub fn new(behavior: OpenBehavior) -> Self {
        Self {
            behavior,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    /// `(url, target)` pairs passed to `open`.
    pub fn opened(&self) -> Vec<(String, String)> {
        lock(&self.recorded).opened.clone()
    }

    /// URLs the current context was navigated to.
    pub fn navigations(&self) -> Vec<String> {
        lock(&self.recorded).navigations.clone()
    }

    pub fn focus_count(&self) -> usize {
        lock(&self.recorded).focus_count
    }

    pub fn close_count(&self) -> usize {
        lock(&self.recorded).close_count
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct FakeHandle {
    closed: Option<bool>,
    recorded: Arc<Mutex<Recorded>>,
}

impl WindowHandle for FakeHandle {
    fn closed(&self) -> Option<bool> {
        self.closed
    }

    fn focus(&self) {
        lock(&self.recorded).focus_count += 1;
    }

    fn close(&self) {
        lock(&self.recorded).close_count += 1;
    }
}

impl Browser for FakeBrowser {
    fn open(
        &self,
        url: &str,
        target: &Target,
    ) -> Result<Option<Box<dyn WindowHandle>>, BrowserError> {
        lock(&self.recorded)
            .opened
            .push((url.to_string(), target.as_str().to_string()));

        let closed = match &self.behavior {
            OpenBehavior::Open => Some(false),
            OpenBehavior::Closed => Some(true),
            OpenBehavior::Unreadable => None,
            OpenBehavior::NoHandle => return Ok(None),
            OpenBehavior::Error(message) => {
                return Err(BrowserError::OpenFailed {
                    url: url.to_string(),
                    message: message.clone(),
                })
            }
        };

        Ok(Some(Box::new(FakeHandle {
            closed,
            recorded: self.recorded.clone(),
        })))
    }

    fn navigate_current(&self, url: &str) {
        lock(&self.recorded).navigations.push(url.to_string());
    }
}

/// Collects alerts instead of showing them.
#[derive(Debug, Clone, Default)]
pub struct FakeNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl FakeNotifier {
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl Notifier for FakeNotifier {
    fn alert(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}
