pub mod config;
pub mod error;
pub mod http;
pub mod navigation;
pub mod ordering;
pub mod session;
pub mod storage;
pub mod types;

pub use config::{ConfigError, MealflowConfig};
pub use error::{FetchError, MappingError, NavigationBlocked, OrderLinkError, StoreResolutionError};
pub use http::{ApiClient, ApiClientBuilder, HttpClient, MockClient, MockResponse};
pub use navigation::{
    can_open_new_tabs, open_url_with_warning, safe_open_url, try_open_url, Browser,
    BrowserError, NavigationOutcome, Notifier, Target, WindowHandle,
};
pub use ordering::{build_order_link, IngredientMapper, OrderLinkAssembler, StoreResolver};
pub use session::{
    Clipboard, ClipboardError, MemoryClipboard, OrderSession, OrderState, SessionError,
};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, Preferences, StorageError, Theme, UnknownTheme,
};
pub use types::{Ingredient, MappedProduct, OrderLink, Recipe, RecipeFilters, StoreLink};

