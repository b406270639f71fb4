use std::future::Future;

use serde_json::Value;
use tracing::debug;

use super::ProductRecord;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {status}")]
    Status { status: u16 },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("invalid JSON in product feed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("product feed must be a JSON array")]
    NotAList,
}

/// Anything able to produce the raw product list for one page load.
pub trait ProductSource: Send + Sync {
    fn fetch_products(
        &self,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, FetchError>> + Send;
}

/// Plain `GET` against a fixed endpoint: no headers, no query, no retry.
#[derive(Debug, Clone)]
pub struct HttpProductSource {
    client: reqwest::Client,
    url: String,
}

impl HttpProductSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ProductSource for HttpProductSource {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::Body)?;
        debug!(url = %self.url, bytes = body.len(), "product feed downloaded");
        parse_product_list(&body)
    }
}

/// Parses a feed body. The top level must be an array; its elements are kept
/// as-is for the normalizer.
pub fn parse_product_list(body: &[u8]) -> Result<Vec<ProductRecord>, FetchError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Array(records) => Ok(records),
        _ => Err(FetchError::NotAList),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_carries_code() {
        let err = FetchError::Status { status: 500 };
        assert_eq!(err.to_string(), "Network error: 500");
    }

    #[test]
    fn parse_accepts_top_level_array() {
        let records = parse_product_list(br#"[{"name":"Widget"},{"title":"Lamp"}]"#)
            .expect("array parses");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["title"], "Lamp");
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = parse_product_list(b"[{\"name\": ").expect_err("truncated body");
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn parse_rejects_non_array_documents() {
        let err = parse_product_list(br#"{"products": []}"#).expect_err("object body");
        assert!(matches!(err, FetchError::NotAList));
    }
}
