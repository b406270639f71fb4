//! Defensive field extraction for product records whose shape varies by
//! upstream: flat `name`/`price`/`image` objects, `images` arrays, and
//! CMS-style records that nest everything under `fields`.

use serde::Serialize;
use serde_json::{Number, Value};

use super::ProductRecord;

/// Display name used when a record carries no usable name.
pub const UNNAMED_PRODUCT: &str = "Unnamed Product";

/// Image shown when a record carries no usable image URL.
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/600x400?text=No+Image";

/// Prices at or above this value are read as integer cents.
pub const DEFAULT_CENTS_THRESHOLD: f64 = 1000.0;

/// Unit inference for raw prices.
///
/// Upstreams disagree on units: some send `2500` meaning $25.00, others send
/// `12.99`. The rule divides by 100 at or above a threshold, which also means
/// a genuine `1200.00` is read as `12.00`. The threshold is therefore a
/// deployment setting rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRule {
    cents_threshold: Option<f64>,
}

impl PriceRule {
    pub const fn cents_at_or_above(threshold: f64) -> Self {
        Self {
            cents_threshold: Some(threshold),
        }
    }

    /// Every numeric price is taken as already being in currency units.
    pub const fn disabled() -> Self {
        Self {
            cents_threshold: None,
        }
    }

    pub fn apply(&self, raw: f64) -> f64 {
        match self.cents_threshold {
            Some(threshold) if raw >= threshold => raw / 100.0,
            _ => raw,
        }
    }
}

impl Default for PriceRule {
    fn default() -> Self {
        Self::cents_at_or_above(DEFAULT_CENTS_THRESHOLD)
    }
}

/// Display-ready view of a single record. Every field is populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProduct {
    pub name: String,
    pub price: Option<f64>,
    pub image_url: String,
}

/// Carries the deployment-specific parts of normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductNormalizer {
    price_rule: PriceRule,
    placeholder_image: String,
}

impl Default for ProductNormalizer {
    fn default() -> Self {
        Self::new(PriceRule::default(), DEFAULT_PLACEHOLDER_IMAGE)
    }
}

impl ProductNormalizer {
    pub fn new(price_rule: PriceRule, placeholder_image: impl Into<String>) -> Self {
        Self {
            price_rule,
            placeholder_image: placeholder_image.into(),
        }
    }

    pub fn normalize(&self, record: &ProductRecord) -> NormalizedProduct {
        NormalizedProduct {
            name: resolve_name(record),
            price: resolve_price(record, &self.price_rule),
            image_url: resolve_image(record, &self.placeholder_image),
        }
    }
}

/// First truthy of `name`, `title`, `fields.name`; otherwise [`UNNAMED_PRODUCT`].
pub fn resolve_name(record: &ProductRecord) -> String {
    [
        record.get("name"),
        record.get("title"),
        record.get("fields").and_then(|fields| fields.get("name")),
    ]
    .into_iter()
    .flatten()
    .find_map(display_text)
    .unwrap_or_else(|| UNNAMED_PRODUCT.to_string())
}

/// `price`, falling back to `fields.price` only when `price` is absent or null.
/// A non-numeric value yields `None` without consulting the fallback.
pub fn resolve_price(record: &ProductRecord, rule: &PriceRule) -> Option<f64> {
    let raw = present(record.get("price"))
        .or_else(|| present(record.get("fields").and_then(|fields| fields.get("price"))))?;

    raw.as_f64().map(|value| rule.apply(value))
}

/// First usable image URL across the known upstream shapes, else `placeholder`.
pub fn resolve_image(record: &ProductRecord, placeholder: &str) -> String {
    image_candidate(record)
        .map(str::to_string)
        .unwrap_or_else(|| placeholder.to_string())
}

fn image_candidate(record: &ProductRecord) -> Option<&str> {
    let image = record.get("image");

    if let Some(url) = image.and_then(url_of) {
        return Some(url);
    }

    if let Some(url) = record
        .get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(url_of)
    {
        return Some(url);
    }

    if let Some(url) = record
        .get("fields")
        .and_then(|fields| fields.get("image"))
        .and_then(fields_image_url)
    {
        return Some(url);
    }

    image.and_then(non_empty_str)
}

fn fields_image_url(image: &Value) -> Option<&str> {
    match image {
        Value::Array(entries) => {
            let first = entries.first()?;
            url_of(first).or_else(|| {
                first
                    .get("thumbnails")
                    .and_then(|thumbnails| thumbnails.get("large"))
                    .and_then(url_of)
            })
        }
        other => url_of(other),
    }
}

fn url_of(value: &Value) -> Option<&str> {
    value.get("url").and_then(non_empty_str)
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|text| !text.is_empty())
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number_text(number)),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Float-typed whole numbers print without a fractional part (`2.0` as `2`).
fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() => value.to_string(),
        _ => number.to_string(),
    }
}
