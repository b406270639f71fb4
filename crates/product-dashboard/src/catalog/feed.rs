use std::sync::{Arc, Mutex};

use tracing::{error, info};

use super::normalizer::{resolve_name, NormalizedProduct, ProductNormalizer};
use super::render::{ProductContainer, RenderOutcome, DISPLAY_LIMIT};
use super::source::{FetchError, ProductSource};
use super::ProductRecord;

/// Consumer of one retrieval. Every subscriber sees the same list.
pub trait ProductSubscriber: Send + Sync {
    fn on_products(&self, products: &[ProductRecord]);

    fn on_error(&self, _err: &FetchError) {}
}

/// Logs the resolved name of each displayed record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameLogger;

impl NameLogger {
    pub fn lines(products: &[ProductRecord]) -> Vec<String> {
        products
            .iter()
            .take(DISPLAY_LIMIT)
            .enumerate()
            .map(|(index, record)| format!("Product {}: {}", index + 1, resolve_name(record)))
            .collect()
    }
}

impl ProductSubscriber for NameLogger {
    fn on_products(&self, products: &[ProductRecord]) {
        for line in Self::lines(products) {
            info!("{line}");
        }
    }
}

/// Draws into a shared container; failures become the error banner.
#[derive(Debug, Clone)]
pub struct ContainerRenderer {
    container: Arc<Mutex<ProductContainer>>,
    normalizer: ProductNormalizer,
}

impl ContainerRenderer {
    pub fn new(container: Arc<Mutex<ProductContainer>>, normalizer: ProductNormalizer) -> Self {
        Self {
            container,
            normalizer,
        }
    }
}

impl ProductSubscriber for ContainerRenderer {
    fn on_products(&self, products: &[ProductRecord]) {
        let mut container = self.container.lock().expect("container mutex poisoned");
        if let RenderOutcome::NotMounted = container.render(products, &self.normalizer) {
            info!("product container not mounted; skipping render");
        }
    }

    fn on_error(&self, err: &FetchError) {
        let mut container = self.container.lock().expect("container mutex poisoned");
        container.show_error(err.to_string());
    }
}

/// Keeps the normalized form of the displayed records for non-HTML views.
#[derive(Debug, Clone)]
pub struct ProductCollector {
    products: Arc<Mutex<Vec<NormalizedProduct>>>,
    normalizer: ProductNormalizer,
}

impl ProductCollector {
    pub fn new(normalizer: ProductNormalizer) -> Self {
        Self {
            products: Arc::new(Mutex::new(Vec::new())),
            normalizer,
        }
    }

    pub fn products(&self) -> Vec<NormalizedProduct> {
        self.products
            .lock()
            .expect("collector mutex poisoned")
            .clone()
    }
}

impl ProductSubscriber for ProductCollector {
    fn on_products(&self, products: &[ProductRecord]) {
        let normalized = products
            .iter()
            .take(DISPLAY_LIMIT)
            .map(|record| self.normalizer.normalize(record))
            .collect();
        *self.products.lock().expect("collector mutex poisoned") = normalized;
    }

    fn on_error(&self, _err: &FetchError) {
        self.products
            .lock()
            .expect("collector mutex poisoned")
            .clear();
    }
}

/// One retrieval per refresh, fanned out to every subscriber.
pub struct ProductFeed<S> {
    source: S,
    subscribers: Vec<Box<dyn ProductSubscriber>>,
}

impl<S: ProductSource> ProductFeed<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(mut self, subscriber: impl ProductSubscriber + 'static) -> Self {
        self.subscribers.push(Box::new(subscriber));
        self
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Fetches once and notifies subscribers. Failures are logged and handed to
    /// each subscriber's error path before being returned.
    pub async fn refresh(&self) -> Result<usize, FetchError> {
        match self.source.fetch_products().await {
            Ok(products) => {
                info!(records = products.len(), "product feed refreshed");
                for subscriber in &self.subscribers {
                    subscriber.on_products(&products);
                }
                Ok(products.len())
            }
            Err(err) => {
                error!(error = %err, "An error occurred: {err}");
                for subscriber in &self.subscribers {
                    subscriber.on_error(&err);
                }
                Err(err)
            }
        }
    }
}

/// Dashboard wiring for a single page load: name logging plus rendering into
/// `container`. Returns the container after the refresh settles.
pub async fn load_dashboard<S: ProductSource>(
    source: S,
    normalizer: ProductNormalizer,
    container: ProductContainer,
) -> (ProductContainer, Result<usize, FetchError>) {
    let shared = Arc::new(Mutex::new(container));
    let feed = ProductFeed::new(source)
        .subscribe(NameLogger)
        .subscribe(ContainerRenderer::new(shared.clone(), normalizer));

    let outcome = feed.refresh().await;
    drop(feed);

    let container = match Arc::try_unwrap(shared) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        Err(shared) => shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone(),
    };

    (container, outcome)
}

/// JSON-view wiring for a single load: name logging plus normalization of the
/// displayed records. Failures take the same error path as [`load_dashboard`].
pub async fn load_products<S: ProductSource>(
    source: S,
    normalizer: ProductNormalizer,
) -> Result<Vec<NormalizedProduct>, FetchError> {
    let collector = ProductCollector::new(normalizer);
    ProductFeed::new(source)
        .subscribe(NameLogger)
        .subscribe(collector.clone())
        .refresh()
        .await?;

    Ok(collector.products())
}
