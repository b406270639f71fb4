use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::catalog::{
    FetchError, HttpProductSource, ProductRecord, ProductSource, ProductSubscriber,
};

/// Serves `body` with `status` at `/products` on an ephemeral port and
/// returns the feed URL plus a hit counter.
pub(super) async fn spawn_upstream(
    status: StatusCode,
    body: &'static str,
) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/products",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, [("content-type", "application/json")], body)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub upstream");
    let addr = listener.local_addr().expect("stub upstream address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub upstream serves");
    });

    (format!("http://{addr}/products"), hits)
}

/// Client for loopback stubs; ambient proxy settings must not apply.
pub(super) fn local_source(url: String) -> HttpProductSource {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client builds");
    HttpProductSource::with_client(client, url)
}

/// An address nothing listens on.
pub(super) async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}/products")
}

pub(super) const SIX_PRODUCTS: &str = r#"[
    {"name": "Alpha", "price": 2500, "image": {"url": "alpha.png"}},
    {"title": "Bravo", "price": 12.5, "images": [{"url": "bravo.png"}]},
    {"fields": {"name": "Charlie", "price": 12, "image": [{"url": "x.png"}]}},
    {"name": "", "price": "n/a"},
    {"name": "Echo", "image": "echo.png"},
    {"name": "Foxtrot", "price": 100}
]"#;

pub(super) fn widget() -> Value {
    json!({ "name": "Widget", "price": 2500 })
}

/// In-memory source returning a canned list or a status failure.
pub(super) struct StaticSource {
    outcome: Result<Vec<ProductRecord>, u16>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub(super) fn records(records: Vec<ProductRecord>) -> Self {
        Self {
            outcome: Ok(records),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing(status: u16) -> Self {
        Self {
            outcome: Err(status),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProductSource for StaticSource {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(records) => Ok(records.clone()),
            Err(status) => Err(FetchError::Status { status: *status }),
        }
    }
}

impl ProductSource for Arc<StaticSource> {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, FetchError> {
        self.as_ref().fetch_products().await
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingSubscriber {
    deliveries: Arc<Mutex<Vec<Vec<ProductRecord>>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl RecordingSubscriber {
    pub(super) fn deliveries(&self) -> Vec<Vec<ProductRecord>> {
        self.deliveries.lock().expect("deliveries mutex poisoned").clone()
    }

    pub(super) fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("errors mutex poisoned").clone()
    }
}

impl ProductSubscriber for RecordingSubscriber {
    fn on_products(&self, products: &[ProductRecord]) {
        self.deliveries
            .lock()
            .expect("deliveries mutex poisoned")
            .push(products.to_vec());
    }

    fn on_error(&self, err: &FetchError) {
        self.errors
            .lock()
            .expect("errors mutex poisoned")
            .push(err.to_string());
    }
}

/// Formatted log output captured on the current thread.
#[derive(Default, Clone)]
pub(super) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(super) fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub(super) fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log buffer mutex poisoned");
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("log buffer mutex poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
