//! Order attempt state owned by the invoking view.
//!
//! `idle -> ordering -> {link_ready | failed}`. Manual open and copy are
//! allowed from `link_ready` as often as the user likes; a new order starts
//! over and forgets the previous link or error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::error::NAVIGATION_BLOCKED_MESSAGE;
use crate::http::HttpClient;
use crate::navigation::{safe_open_url, Browser, Target};
use crate::ordering::OrderLinkAssembler;
use crate::types::{Ingredient, OrderLink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderState {
    Idle,
    Ordering,
    LinkReady {
        link: OrderLink,
        /// Set when the automatic open was blocked.
        notice: Option<String>,
    },
    Failed {
        message: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Somewhere to put a copied link.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// In-memory clipboard. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("An order is already in progress")]
    InFlight,

    #[error("No order link is ready")]
    NoLink,

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Drives one view's order attempts.
pub struct OrderSession<C> {
    assembler: OrderLinkAssembler<C>,
    browser: Box<dyn Browser>,
    clipboard: Box<dyn Clipboard>,
    auto_open: bool,
    fallback_to_current: bool,
    state: Mutex<OrderState>,
}

/// Returns the session to idle if an attempt is dropped before it finishes.
struct InFlightGuard<'a> {
    state: &'a Mutex<OrderState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == OrderState::Ordering {
            tracing::debug!("order attempt abandoned");
            *state = OrderState::Idle;
        }
    }
}

impl<C: HttpClient> OrderSession<C> {
    pub fn new(
        assembler: OrderLinkAssembler<C>,
        browser: Box<dyn Browser>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        Self {
            assembler,
            browser,
            clipboard,
            auto_open: true,
            fallback_to_current: true,
            state: Mutex::new(OrderState::Idle),
        }
    }

    /// Whether a ready link is opened straight away. Defaults to true.
    pub fn auto_open(mut self, auto_open: bool) -> Self {
        self.auto_open = auto_open;
        self
    }

    /// Whether a blocked popup falls back to the current context. Defaults to true.
    pub fn fallback_to_current(mut self, fallback: bool) -> Self {
        self.fallback_to_current = fallback;
        self
    }

    fn lock(&self) -> MutexGuard<'_, OrderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> OrderState {
        self.lock().clone()
    }

    /// The ready link, if any.
    pub fn link(&self) -> Option<OrderLink> {
        match &*self.lock() {
            OrderState::LinkReady { link, .. } => Some(link.clone()),
            _ => None,
        }
    }

    /// Run one order attempt and return the state it ends in.
    ///
    /// Fails only when another attempt is still in flight; pipeline failures end
    /// in `OrderState::Failed`.
    pub async fn order(&self, ingredients: &[Ingredient]) -> Result<OrderState, SessionError> {
        {
            let mut state = self.lock();
            if *state == OrderState::Ordering {
                tracing::warn!("order requested while another is in flight");
                return Err(SessionError::InFlight);
            }
            *state = OrderState::Ordering;
        }
        let _guard = InFlightGuard { state: &self.state };

        let next = match self.assembler.generate_order_link(ingredients).await {
            Ok(link) => {
                let notice = if self.auto_open
                    && !safe_open_url(
                        self.browser.as_ref(),
                        link.as_str(),
                        &Target::Blank,
                        self.fallback_to_current,
                    ) {
                    Some(NAVIGATION_BLOCKED_MESSAGE.to_string())
                } else {
                    None
                };
                OrderState::LinkReady { link, notice }
            }
            Err(e) => OrderState::Failed {
                message: e.user_message().to_string(),
            },
        };

        *self.lock() = next.clone();
        Ok(next)
    }

    /// Open the ready link again. Returns whether navigation happened.
    pub fn manual_open(&self) -> Result<bool, SessionError> {
        let link = self.link().ok_or(SessionError::NoLink)?;
        Ok(safe_open_url(
            self.browser.as_ref(),
            link.as_str(),
            &Target::Blank,
            self.fallback_to_current,
        ))
    }

    /// Copy the ready link to the clipboard.
    pub fn copy_link(&self) -> Result<(), SessionError> {
        let link = self.link().ok_or(SessionError::NoLink)?;
        self.clipboard
            .write_text(link.as_str())
            .inspect_err(|e| tracing::error!(error = %e, "failed to copy order link"))?;
        tracing::info!("order link copied");
        Ok(())
    }
}
