use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{info_span, Instrument};

use crate::config::MealflowConfig;
use crate::error::OrderLinkError;
use crate::http::HttpClient;
use crate::types::{Ingredient, MappedProduct, OrderLink, StoreLink};

use super::mapper::IngredientMapper;
use super::store::StoreResolver;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Join mapped products onto a store link as `ids` and `titles` query parameters.
///
/// Ids are joined as-is; the joined titles are percent-encoded as a whole, so the
/// separating commas become `%2C`. The store link is used exactly as received;
/// the parameters go before any `#fragment` so the storefront still sees them.
pub fn build_order_link(store: &StoreLink, products: &[MappedProduct]) -> OrderLink {
    let ids = products
        .iter()
        .map(|p| p.id.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let titles = products
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let (base, fragment) = match store.as_str().split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (store.as_str(), None),
    };

    let separator = if base.ends_with('?') || base.ends_with('&') {
        ""
    } else if base.contains('?') {
        "&"
    } else {
        "?"
    };

    let mut link = format!(
        "{}{}ids={}&titles={}",
        base,
        separator,
        ids,
        utf8_percent_encode(&titles, URI_COMPONENT)
    );
    if let Some(fragment) = fragment {
        link.push('#');
        link.push_str(fragment);
    }

    OrderLink::new(link)
}

/// Runs ingredient mapping, then store resolution, and assembles the order link.
pub struct OrderLinkAssembler<C> {
    mapper: IngredientMapper<C>,
    resolver: StoreResolver<C>,
}

impl<C: HttpClient> OrderLinkAssembler<C> {
    pub fn new(mapper: IngredientMapper<C>, resolver: StoreResolver<C>) -> Self {
        Self { mapper, resolver }
    }

    /// Build an assembler whose mapper and resolver share one client.
    pub fn from_config(client: C, config: &MealflowConfig) -> Self
    where
        C: Clone,
    {
        Self::new(
            IngredientMapper::from_config(client.clone(), config),
            StoreResolver::from_config(client, config),
        )
    }

    /// Generate a storefront link for the given ingredients.
    ///
    /// The store is only resolved after mapping succeeds. Either failure aborts
    /// the attempt and no link is produced.
    pub async fn generate_order_link(
        &self,
        ingredients: &[Ingredient],
    ) -> Result<OrderLink, OrderLinkError> {
        async {
            let products = self.mapper.map(ingredients).await?;
            let store = self.resolver.resolve().await?;

            if products.is_empty() {
                tracing::warn!("mapper matched no products, link will carry empty ids");
            }

            let link = build_order_link(&store, &products);
            tracing::info!(link = %link, products = products.len(), "order link ready");
            Ok::<_, OrderLinkError>(link)
        }
        .instrument(info_span!("order_link", ingredients = ingredients.len()))
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to build order link"))
    }
}
