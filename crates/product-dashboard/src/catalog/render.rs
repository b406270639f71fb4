use std::fmt::Write as _;

use serde::Serialize;

use super::normalizer::{NormalizedProduct, ProductNormalizer};
use super::ProductRecord;

/// Element id of the single render target.
pub const CONTAINER_ID: &str = "product-container";

/// Number of records shown per render; extra records are dropped silently.
pub const DISPLAY_LIMIT: usize = 5;

const MISSING_PRICE_LABEL: &str = "Price: —";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    pub image_url: String,
    pub name: String,
    pub price_label: String,
}

impl ProductCard {
    pub fn from_product(product: NormalizedProduct) -> Self {
        Self {
            price_label: price_label(product.price),
            image_url: product.image_url,
            name: product.name,
        }
    }

    /// `alt` text of the card image.
    pub fn alt(&self) -> &str {
        &self.name
    }

    fn write_html(&self, html: &mut String) {
        let name = escape_html(&self.name);
        write!(
            html,
            "<article class=\"product-card\"><img src=\"{}\" alt=\"{}\"><div class=\"content\"><h3 class=\"name\">{}</h3><p class=\"price\">{}</p></div></article>",
            escape_html(&self.image_url),
            name,
            name,
            escape_html(&self.price_label),
        )
        .expect("write product card");
    }
}

pub fn price_label(price: Option<f64>) -> String {
    match price {
        Some(value) if value.is_finite() => format!("Price: ${}", two_decimals(value)),
        _ => MISSING_PRICE_LABEL.to_string(),
    }
}

/// Two-decimal text with exact half-cent ties rounded away from zero.
///
/// `{:.2}` already rounds on the exact binary value, so `1.005` (stored just
/// below the tie) stays `1.00`. Only exact ties need help: a binary double
/// sits exactly on a half cent iff it is an odd multiple of 1/8.
fn two_decimals(value: f64) -> String {
    let eighths = value * 8.0;
    let on_tie = eighths.fract() == 0.0 && eighths % 2.0 != 0.0;
    let value = if on_tie {
        // One ulp further from zero, past the tie.
        f64::from_bits(value.to_bits() + 1)
    } else {
        value
    };
    format!("{value:.2}")
}

/// What the mounted container currently shows. Cards and an error banner are
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerContent {
    Cards(Vec<ProductCard>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    NotMounted,
    Rendered { cards: usize },
}

/// The display target. A page without the target is modelled explicitly so
/// callers can tell "nothing to draw into" apart from "drew nothing".
#[derive(Debug, Clone, PartialEq)]
pub enum ProductContainer {
    NotMounted,
    Mounted(ContainerContent),
}

impl Default for ProductContainer {
    fn default() -> Self {
        Self::mounted()
    }
}

impl ProductContainer {
    pub fn mounted() -> Self {
        Self::Mounted(ContainerContent::Cards(Vec::new()))
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted(_))
    }

    pub fn cards(&self) -> &[ProductCard] {
        match self {
            Self::Mounted(ContainerContent::Cards(cards)) => cards,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Mounted(ContainerContent::Error(message)) => Some(message),
            _ => None,
        }
    }

    /// Replaces the content with cards for the first [`DISPLAY_LIMIT`] records.
    pub fn render(
        &mut self,
        products: &[ProductRecord],
        normalizer: &ProductNormalizer,
    ) -> RenderOutcome {
        let Self::Mounted(content) = self else {
            return RenderOutcome::NotMounted;
        };

        let cards: Vec<ProductCard> = products
            .iter()
            .take(DISPLAY_LIMIT)
            .map(|record| ProductCard::from_product(normalizer.normalize(record)))
            .collect();
        let count = cards.len();
        *content = ContainerContent::Cards(cards);

        RenderOutcome::Rendered { cards: count }
    }

    /// Replaces the content with an error banner. No-op when not mounted.
    pub fn show_error(&mut self, message: impl Into<String>) {
        if let Self::Mounted(content) = self {
            *content = ContainerContent::Error(message.into());
        }
    }

    /// Inner markup of the container element.
    pub fn inner_html(&self) -> String {
        let mut html = String::new();
        match self {
            Self::NotMounted => {}
            Self::Mounted(ContainerContent::Cards(cards)) => {
                for card in cards {
                    card.write_html(&mut html);
                }
            }
            Self::Mounted(ContainerContent::Error(message)) => {
                write!(
                    html,
                    "<div class=\"error\">{}</div>",
                    escape_html(&error_banner_text(message))
                )
                .expect("write error banner");
            }
        }
        html
    }

    /// The container element itself; empty for an unmounted target.
    pub fn to_html(&self) -> String {
        if !self.is_mounted() {
            return String::new();
        }
        format!(
            "<section id=\"{CONTAINER_ID}\">{}</section>",
            self.inner_html()
        )
    }
}

fn error_banner_text(message: &str) -> String {
    format!("An error occurred: {message}")
}

/// Complete dashboard document around `container`.
pub fn render_page(container: &ProductContainer) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Product Dashboard</title>\n");
    html.push_str(
        "<style>#product-container{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:1rem}.product-card img{width:100%}.error{color:#b00020}</style>\n",
    );
    html.push_str("</head>\n<body>\n<h1>Product Dashboard</h1>\n");
    html.push_str(&container.to_html());
    html.push_str("\n</body>\n</html>\n");
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
