//! MealFlow configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default API base URL (the local proxy in front of the MealFlow service).
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Default mapping language.
pub const DEFAULT_LANGUAGE: &str = "uk";

/// Identifies us to the ingredient mapper.
pub const DEFAULT_SOURCE_APP: &str = "mealflow-cooking-app";

pub const DEFAULT_PLATFORM: &str = "web";

pub const DEFAULT_COUNTRY: &str = "UA";

/// Default transport timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Ordering client configuration.
#[derive(Debug, Clone)]
pub struct MealflowConfig {
    /// Static key sent as `x-api-key` on every request.
    pub api_key: String,
    /// Base URL the `/api/v1/...` paths are resolved against.
    pub base_url: String,
    /// Language tag sent to the ingredient mapper.
    pub language: String,
    pub source_app: String,
    /// Platform tag for store resolution.
    pub platform: String,
    /// Country code for store resolution.
    pub country: String,
    pub timeout: Duration,
    /// Where the CLI keeps its key-value store.
    pub storage_path: PathBuf,
}

impl MealflowConfig {
    /// Configuration with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            source_app: DEFAULT_SOURCE_APP.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_path: Self::default_storage_path(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `MEALFLOW_API_KEY`: API key for the MealFlow service
    ///
    /// Optional:
    /// - `MEALFLOW_BASE_URL`: API base URL (default: "http://localhost:3001")
    /// - `MEALFLOW_LANGUAGE`: Mapping language (default: "uk")
    /// - `MEALFLOW_SOURCE_APP`: Source app tag (default: "mealflow-cooking-app")
    /// - `MEALFLOW_PLATFORM`: Store platform (default: "web")
    /// - `MEALFLOW_COUNTRY`: Store country code (default: "UA")
    /// - `MEALFLOW_TIMEOUT_SECS`: Request timeout (default: 30)
    /// - `MEALFLOW_STORAGE`: Key-value store file (default: "~/.mealflow/storage.json")
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("MEALFLOW_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("MEALFLOW_API_KEY".to_string()))?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) = env::var("MEALFLOW_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(language) = env::var("MEALFLOW_LANGUAGE") {
            config.language = language;
        }
        if let Ok(source_app) = env::var("MEALFLOW_SOURCE_APP") {
            config.source_app = source_app;
        }
        if let Ok(platform) = env::var("MEALFLOW_PLATFORM") {
            config.platform = platform;
        }
        if let Ok(country) = env::var("MEALFLOW_COUNTRY") {
            config.country = country.to_uppercase();
        }
        if let Ok(secs) = env::var("MEALFLOW_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidValue {
                name: "MEALFLOW_TIMEOUT_SECS".to_string(),
                value: secs.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.storage_path = Self::storage_path_from_env();

        Ok(config)
    }

    /// `MEALFLOW_STORAGE` if set, otherwise the default. Needs no API key, so
    /// storage-only callers can use it without loading the full config.
    pub fn storage_path_from_env() -> PathBuf {
        env::var("MEALFLOW_STORAGE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_storage_path())
    }

    /// Get the default storage file: ~/.mealflow/storage.json
    pub fn default_storage_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".mealflow").join("storage.json"))
            .unwrap_or_else(|| PathBuf::from("data/storage.json"))
    }
}
