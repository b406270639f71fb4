//! Product feed retrieval, defensive field normalization, and card rendering.
//!
//! A page load performs one retrieval through a [`ProductSource`]; the
//! [`ProductFeed`] hands the same record list to every subscriber (name
//! logging and the container renderer), and routes any failure through the
//! shared error path so the container ends up showing either cards or a
//! single error banner.

pub mod feed;
pub mod normalizer;
pub mod render;
pub mod source;

#[cfg(test)]
mod tests;

/// Raw upstream record. No field is guaranteed.
pub type ProductRecord = serde_json::Value;

pub use feed::{
    load_dashboard, load_products, ContainerRenderer, NameLogger, ProductCollector, ProductFeed,
    ProductSubscriber,
};
pub use normalizer::{
    resolve_image, resolve_name, resolve_price, NormalizedProduct, PriceRule, ProductNormalizer,
    DEFAULT_CENTS_THRESHOLD, DEFAULT_PLACEHOLDER_IMAGE, UNNAMED_PRODUCT,
};
pub use render::{
    price_label, render_page, ContainerContent, ProductCard, ProductContainer, RenderOutcome,
    CONTAINER_ID, DISPLAY_LIMIT,
};
pub use source::{parse_product_list, FetchError, HttpProductSource, ProductSource};
