//! The "order ingredients" pipeline.
//!
//! `IngredientMapper` turns recipe ingredients into store product ids,
//! `StoreResolver` finds the storefront for our platform/country, and
//! `OrderLinkAssembler` runs the two in order and joins their results into a
//! single deep link.

mod assembler;
mod mapper;
mod store;

pub use assembler::{build_order_link, OrderLinkAssembler};
pub use mapper::{IngredientMapper, IngredientQuery};
pub use store::{normalize_store_response, StoreDescriptor, StoreResolver};
