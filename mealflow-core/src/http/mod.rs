//! HTTP access to the MealFlow API.
//!
//! Every outgoing request goes through the `HttpClient` trait so the ordering
//! pipeline can run against `MockClient` in tests.

mod client;

pub use client::{
    ApiClient, ApiClientBuilder, HttpClient, MockClient, MockResponse, RecordedRequest,
};

/// Ingredient mapping endpoint.
pub const MAP_INGREDIENTS_PATH: &str = "/api/v1/map-ingredients";

/// Store resolution endpoint. Takes `platform` and `country` query parameters.
pub const FALLBACK_APP_PATH: &str = "/api/v1/fallback-app";

/// Build the store resolution path for a platform/country pair.
/// e.g., ("web", "UA") -> "/api/v1/fallback-app?platform=web&country=UA"
pub fn fallback_app_path(platform: &str, country: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("platform", platform)
        .append_pair("country", country)
        .finish();
    format!("{}?{}", FALLBACK_APP_PATH, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_app_path() {
        assert_eq!(
            fallback_app_path("web", "UA"),
            "/api/v1/fallback-app?platform=web&country=UA"
        );
    }
}
