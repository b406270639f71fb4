use crate::cli::ServeArgs;
use crate::infra::{AppState, CatalogHandle};
use crate::routes::dashboard_router;
use axum_prometheus::PrometheusMetricLayer;
use product_dashboard::config::AppConfig;
use product_dashboard::error::AppError;
use product_dashboard::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: CatalogHandle::from_config(&config.catalog),
    };

    let app = dashboard_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        feed = %config.catalog.api_url,
        "product dashboard ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
