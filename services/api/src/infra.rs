use metrics_exporter_prometheus::PrometheusHandle;
use product_dashboard::catalog::{HttpProductSource, ProductNormalizer};
use product_dashboard::config::CatalogConfig;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: CatalogHandle,
}

/// Everything a page load needs to reach the upstream feed.
#[derive(Debug, Clone)]
pub(crate) struct CatalogHandle {
    pub(crate) source: HttpProductSource,
    pub(crate) normalizer: ProductNormalizer,
}

impl CatalogHandle {
    pub(crate) fn from_config(config: &CatalogConfig) -> Self {
        Self {
            source: HttpProductSource::new(config.api_url.clone()),
            normalizer: ProductNormalizer::new(
                config.price_rule,
                config.placeholder_image.clone(),
            ),
        }
    }
}

/// Catalog wired to a loopback stub; ambient proxy settings must not apply.
#[cfg(test)]
pub(crate) fn local_catalog(api_url: String) -> CatalogHandle {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client builds");
    CatalogHandle {
        source: HttpProductSource::with_client(client, api_url),
        normalizer: ProductNormalizer::default(),
    }
}
