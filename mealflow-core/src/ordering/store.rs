use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::MealflowConfig;
use crate::error::StoreResolutionError;
use crate::http::{fallback_app_path, HttpClient};
use crate::types::StoreLink;

/// A storefront entry of the fallback-app response.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreDescriptor {
    #[serde(default)]
    pub store_link: Option<String>,
    #[serde(default)]
    pub deeplink: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub is_partner: Option<bool>,
    #[serde(default)]
    pub partner_priority: Option<i64>,
    #[serde(default)]
    pub redirect_type: Option<String>,
}

/// The two shapes the fallback-app endpoint has returned.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FallbackAppResponse {
    /// Current: descriptors nested under `stores`.
    Stores { stores: Vec<StoreDescriptor> },
    /// Older: a bare `store_link`.
    Direct { store_link: String },
}

/// Normalize a fallback-app response body into a single store link.
pub fn normalize_store_response(json: JsonValue) -> Result<StoreLink, StoreResolutionError> {
    let response: FallbackAppResponse = serde_json::from_value(json).map_err(|_| {
        StoreResolutionError::Malformed("expected `stores` or `store_link`".to_string())
    })?;

    let link = match response {
        FallbackAppResponse::Stores { stores } => {
            let first = stores
                .into_iter()
                .next()
                .ok_or(StoreResolutionError::NoStores)?;
            if let Some(app_name) = &first.app_name {
                tracing::debug!(app_name, is_partner = ?first.is_partner, "using first store");
            }
            first.store_link.ok_or_else(|| {
                StoreResolutionError::Malformed("stores[0].store_link is missing".to_string())
            })?
        }
        FallbackAppResponse::Direct { store_link } => store_link,
    };

    parse_store_link(&link)
}

fn parse_store_link(link: &str) -> Result<StoreLink, StoreResolutionError> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return Err(StoreResolutionError::InvalidLink {
            link: link.to_string(),
            reason: "empty".to_string(),
        });
    }

    let url = url::Url::parse(trimmed).map_err(|e| StoreResolutionError::InvalidLink {
        link: link.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(StoreResolutionError::InvalidLink {
            link: link.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }

    Ok(StoreLink::new(trimmed, url))
}

/// Resolves the storefront URL for a platform/country pair. Never cached.
pub struct StoreResolver<C> {
    client: C,
    platform: String,
    country: String,
}

impl<C: HttpClient> StoreResolver<C> {
    pub fn new(client: C, platform: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            client,
            platform: platform.into(),
            country: country.into(),
        }
    }

    pub fn from_config(client: C, config: &MealflowConfig) -> Self {
        Self::new(client, &config.platform, &config.country)
    }

    /// Fetch the store link for this resolver's platform/country.
    pub async fn resolve(&self) -> Result<StoreLink, StoreResolutionError> {
        let path = fallback_app_path(&self.platform, &self.country);
        tracing::debug!(
            platform = %self.platform,
            country = %self.country,
            "resolving store link"
        );

        let json = self
            .client
            .get_json(&path)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error fetching store link"))?;

        let link = normalize_store_response(json)
            .inspect_err(|e| tracing::error!(error = %e, "store_link missing from response"))?;

        tracing::info!(store_link = %link, "store link resolved");
        Ok(link)
    }
}
