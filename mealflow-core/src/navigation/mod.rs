//! Opening order links in a new browsing context.
//!
//! Popup blockers are detected by inspecting the handle `Browser::open` returns,
//! right after the call. This is a heuristic: some browsers hand back a live
//! handle and still refuse to render, so callers always keep a manual
//! open/copy path for the user.

mod fake;

pub use fake::{FakeBrowser, FakeNotifier, OpenBehavior};

use thiserror::Error;

use crate::error::NavigationBlocked;

/// Shown before opening when the caller asks for a warning.
pub const DEFAULT_OPEN_WARNING: &str =
    "Якщо посилання не відкрилося, натисніть на нього ще раз або скопіюйте в нову вкладку.";

/// Where to open a link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Target {
    /// `_blank`: a new tab or window.
    #[default]
    Blank,
    /// `_self`: the current context.
    Current,
    /// A named browsing context.
    Named(String),
}

impl Target {
    pub fn as_str(&self) -> &str {
        match self {
            Target::Blank => "_blank",
            Target::Current => "_self",
            Target::Named(name) => name,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum BrowserError {
    #[error("Failed to open {url}: {message}")]
    OpenFailed { url: String, message: String },
}

/// A handle to a browsing context opened by `Browser::open`.
pub trait WindowHandle: Send {
    /// Whether the context is closed. `None` when the state cannot be read.
    fn closed(&self) -> Option<bool>;

    fn focus(&self);

    fn close(&self);
}

/// The host environment's navigation primitives.
pub trait Browser: Send + Sync {
    /// Open `url` in `target`. A blocked popup may surface as `Ok(None)`.
    fn open(
        &self,
        url: &str,
        target: &Target,
    ) -> Result<Option<Box<dyn WindowHandle>>, BrowserError>;

    /// Navigate the current context to `url`.
    fn navigate_current(&self, url: &str);
}

/// Shows messages to the user.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Where a successful navigation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    NewContext,
    CurrentContext,
}

/// Open `url`, falling back to the current context when the popup is blocked
/// and `fallback_to_current` is set.
pub fn try_open_url(
    browser: &dyn Browser,
    url: &str,
    target: &Target,
    fallback_to_current: bool,
) -> Result<NavigationOutcome, NavigationBlocked> {
    let blocked = match browser.open(url, target) {
        Ok(Some(handle)) => match handle.closed() {
            Some(false) => {
                handle.focus();
                return Ok(NavigationOutcome::NewContext);
            }
            Some(true) => "handle already closed",
            None => "handle state unreadable",
        },
        Ok(None) => "no handle returned",
        Err(e) => {
            tracing::error!(url, error = %e, "error opening link");
            "open failed"
        }
    };

    tracing::warn!(url, target = target.as_str(), reason = blocked, "browser blocked the new tab");

    if fallback_to_current {
        tracing::info!(url, "navigating in the current context");
        browser.navigate_current(url);
        return Ok(NavigationOutcome::CurrentContext);
    }

    Err(NavigationBlocked {
        url: url.to_string(),
    })
}

/// Boolean form of `try_open_url`: true when navigation happened anywhere.
pub fn safe_open_url(
    browser: &dyn Browser,
    url: &str,
    target: &Target,
    fallback_to_current: bool,
) -> bool {
    try_open_url(browser, url, target, fallback_to_current).is_ok()
}

/// Probe whether new contexts can be opened without user interaction.
pub fn can_open_new_tabs(browser: &dyn Browser) -> bool {
    match browser.open("about:blank", &Target::Blank) {
        Ok(Some(handle)) => {
            handle.close();
            true
        }
        Ok(None) | Err(_) => false,
    }
}

/// Warn the user, then open `url` with fallback. If that still fails, show the
/// link so it can be copied by hand.
pub fn open_url_with_warning(
    browser: &dyn Browser,
    notifier: &dyn Notifier,
    url: &str,
    message: Option<&str>,
) {
    notifier.alert(message.unwrap_or(DEFAULT_OPEN_WARNING));

    if !safe_open_url(browser, url, &Target::Blank, true) {
        notifier.alert(&format!(
            "Посилання: {}\n\nСкопіюйте це посилання та відкрийте в новій вкладці.",
            url
        ));
    }
}
