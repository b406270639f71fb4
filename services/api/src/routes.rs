use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use product_dashboard::catalog::{
    load_dashboard, load_products, render_page, NormalizedProduct, ProductContainer,
};
use product_dashboard::error::AppError;
use serde_json::json;

pub(crate) fn dashboard_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/v1/products", get(products_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// One page load: a single feed retrieval, logged and rendered. Failures are
/// part of the page, so this always answers 200.
pub(crate) async fn dashboard_page(State(state): State<AppState>) -> Html<String> {
    let (container, _) = load_dashboard(
        state.catalog.source.clone(),
        state.catalog.normalizer.clone(),
        ProductContainer::mounted(),
    )
    .await;

    Html(render_page(&container))
}

pub(crate) async fn products_endpoint(
    State(state): State<AppState>,
) -> Result<Json<Vec<NormalizedProduct>>, AppError> {
    let products = load_products(
        state.catalog.source.clone(),
        state.catalog.normalizer.clone(),
    )
    .await?;

    Ok(Json(products))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
