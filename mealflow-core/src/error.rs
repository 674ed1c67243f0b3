use thiserror::Error;

/// Shown when ingredient mapping fails.
pub const MAPPING_FAILED_MESSAGE: &str = "Не вдалося знайти інгредієнти";

/// Shown when the storefront link cannot be resolved.
pub const STORE_FAILED_MESSAGE: &str = "Не вдалося отримати посилання на магазин";

/// Shown in the order banner when no link could be built.
pub const ORDER_LINK_FAILED_MESSAGE: &str = "Не вдалося сформувати посилання для замовлення.";

/// Shown when the link was built but the browser refused to open it.
pub const NAVIGATION_BLOCKED_MESSAGE: &str =
    "Браузер заблокував автоматичне відкриття. Використайте кнопки нижче.";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("No ingredients to map")]
    NoIngredients,

    #[error("Ingredient mapping request failed: {0}")]
    Request(#[from] FetchError),

    #[error("Unexpected map-ingredients response: {0}")]
    InvalidResponse(String),
}

impl MappingError {
    pub fn user_message(&self) -> &'static str {
        MAPPING_FAILED_MESSAGE
    }
}

#[derive(Error, Debug)]
pub enum StoreResolutionError {
    #[error("Store lookup request failed: {0}")]
    Request(#[from] FetchError),

    #[error("Unrecognized fallback-app response: {0}")]
    Malformed(String),

    #[error("Fallback-app response contains no stores")]
    NoStores,

    #[error("Invalid store link {link:?}: {reason}")]
    InvalidLink { link: String, reason: String },
}

impl StoreResolutionError {
    pub fn user_message(&self) -> &'static str {
        STORE_FAILED_MESSAGE
    }
}

#[derive(Error, Debug)]
pub enum OrderLinkError {
    #[error("Could not map ingredients: {0}")]
    Mapping(#[from] MappingError),

    #[error("Could not resolve store link: {0}")]
    StoreResolution(#[from] StoreResolutionError),
}

impl OrderLinkError {
    /// Banner text for the invoking view. The step-specific message is
    /// available through the wrapped error.
    pub fn user_message(&self) -> &'static str {
        ORDER_LINK_FAILED_MESSAGE
    }

    pub fn step_message(&self) -> &'static str {
        match self {
            OrderLinkError::Mapping(e) => e.user_message(),
            OrderLinkError::StoreResolution(e) => e.user_message(),
        }
    }
}

/// The popup was suppressed and falling back to the current context was not allowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Navigation to {url} was blocked")]
pub struct NavigationBlocked {
    pub url: String,
}

impl NavigationBlocked {
    pub fn user_message(&self) -> &'static str {
        NAVIGATION_BLOCKED_MESSAGE
    }
}
