use serde::{Deserialize, Serialize};

use crate::config::MealflowConfig;
use crate::error::MappingError;
use crate::http::{HttpClient, MAP_INGREDIENTS_PATH};
use crate::types::{Ingredient, MappedProduct, MappingMetadata};

/// One entry of the map-ingredients request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientQuery {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl From<&Ingredient> for IngredientQuery {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.to_lowercase(),
            quantity: ingredient.amount,
            unit: ingredient.unit.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MapIngredientsRequest<'a> {
    language: &'a str,
    source_app: &'a str,
    ingredients: Vec<IngredientQuery>,
}

#[derive(Debug, Deserialize)]
struct MapIngredientsResponse {
    products: Vec<MappedProduct>,
    #[serde(default)]
    metadata: Option<MappingMetadata>,
}

/// Maps recipe ingredients to store products with one remote call.
pub struct IngredientMapper<C> {
    client: C,
    language: String,
    source_app: String,
}

impl<C: HttpClient> IngredientMapper<C> {
    pub fn new(client: C, language: impl Into<String>, source_app: impl Into<String>) -> Self {
        Self {
            client,
            language: language.into(),
            source_app: source_app.into(),
        }
    }

    pub fn from_config(client: C, config: &MealflowConfig) -> Self {
        Self::new(client, &config.language, &config.source_app)
    }

    /// Map ingredients to products.
    ///
    /// The service may drop items it cannot match, so the result can be shorter
    /// than the input and is ordered the way the service returns it.
    pub async fn map(
        &self,
        ingredients: &[Ingredient],
    ) -> Result<Vec<MappedProduct>, MappingError> {
        if ingredients.is_empty() {
            return Err(MappingError::NoIngredients);
        }

        let body = serde_json::to_value(MapIngredientsRequest {
            language: &self.language,
            source_app: &self.source_app,
            ingredients: ingredients.iter().map(IngredientQuery::from).collect(),
        })
        .map_err(|e| MappingError::InvalidResponse(format!("could not encode request: {}", e)))?;

        tracing::debug!(
            count = ingredients.len(),
            language = %self.language,
            "mapping ingredients"
        );

        let json = self
            .client
            .post_json(MAP_INGREDIENTS_PATH, &body)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "error mapping ingredients"))?;

        let response: MapIngredientsResponse = serde_json::from_value(json).map_err(|e| {
            tracing::error!(error = %e, "map-ingredients response has unexpected shape");
            MappingError::InvalidResponse(e.to_string())
        })?;

        if let Some(metadata) = &response.metadata {
            tracing::debug!(
                confidence = metadata.mapping_confidence.as_deref().unwrap_or("unknown"),
                mapped = ?metadata.mapped_count,
                total = ?metadata.total_count,
                "ingredient mapping metadata"
            );
        }

        tracing::info!(
            requested = ingredients.len(),
            mapped = response.products.len(),
            "ingredients mapped"
        );

        Ok(response.products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::http::MockClient;
    use serde_json::json;
    use std::sync::Arc;

    fn ingredients() -> Vec<Ingredient> {
        vec![
            Ingredient::new("1", "Молоко", 0.5, "л"),
            Ingredient::new("2", "ЯЙЦЯ", 3.0, "шт"),
        ]
    }

    #[tokio::test]
    async fn test_request_body_has_one_lowercased_entry_per_ingredient() {
        let client = Arc::new(MockClient::new().with_json(
            MAP_INGREDIENTS_PATH,
            json!({"products": [{"id": "p1", "name": "Milk"}]}),
        ));
        let mapper = IngredientMapper::new(client.clone(), "uk", "mealflow-cooking-app");

        mapper.map(&ingredients()).await.unwrap();

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].body,
            Some(json!({
                "language": "uk",
                "source_app": "mealflow-cooking-app",
                "ingredients": [
                    {"name": "молоко", "quantity": 0.5, "unit": "л"},
                    {"name": "яйця", "quantity": 3.0, "unit": "шт"}
                ]
            }))
        );
    }

    #[tokio::test]
    async fn test_returns_products_in_service_order() {
        let client = MockClient::new().with_json(
            MAP_INGREDIENTS_PATH,
            json!({
                "products": [{"id": "p2", "name": "Eggs"}, {"id": "p1", "name": "Milk"}],
                "metadata": {
                    "mapping_confidence": "high",
                    "lang": "uk",
                    "mapped_count": 2,
                    "total_count": 2
                }
            }),
        );
        let mapper = IngredientMapper::new(client, "uk", "app");

        let products = mapper.map(&ingredients()).await.unwrap();
        assert_eq!(
            products,
            vec![MappedProduct::new("p2", "Eggs"), MappedProduct::new("p1", "Milk")]
        );
    }

    #[tokio::test]
    async fn test_empty_input_sends_nothing() {
        let client = Arc::new(MockClient::new());
        let mapper = IngredientMapper::new(client.clone(), "uk", "app");

        let err = mapper.map(&[]).await.unwrap_err();
        assert!(matches!(err, MappingError::NoIngredients));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_network_error_is_mapping_error() {
        let client = MockClient::new().with_error(MAP_INGREDIENTS_PATH, "connection reset");
        let mapper = IngredientMapper::new(client, "uk", "app");

        let err = mapper.map(&ingredients()).await.unwrap_err();
        assert!(matches!(err, MappingError::Request(FetchError::Network(_))));
        assert_eq!(err.user_message(), "Не вдалося знайти інгредієнти");
    }

    #[tokio::test]
    async fn test_missing_products_is_invalid_response() {
        let client = MockClient::new().with_json(MAP_INGREDIENTS_PATH, json!({"items": []}));
        let mapper = IngredientMapper::new(client, "uk", "app");

        let err = mapper.map(&ingredients()).await.unwrap_err();
        assert!(matches!(err, MappingError::InvalidResponse(_)));
    }
}
