use crate::catalog::{PriceRule, DEFAULT_CENTS_THRESHOLD, DEFAULT_PLACEHOLDER_IMAGE};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Upstream feed used when `PRODUCTS_API_URL` is not set.
pub const DEFAULT_PRODUCTS_API_URL: &str = "https://www.course-api.com/javascript-store-products";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            catalog: CatalogConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the product feed lives and how its records are normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub api_url: String,
    pub placeholder_image: String,
    pub price_rule: PriceRule,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PRODUCTS_API_URL.to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            price_rule: PriceRule::default(),
        }
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = checked_api_url(
            env::var("PRODUCTS_API_URL").unwrap_or_else(|_| DEFAULT_PRODUCTS_API_URL.to_string()),
        )?;

        let placeholder_image = env::var("PRODUCTS_PLACEHOLDER_IMAGE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE.to_string());

        let price_rule = match env::var("PRODUCTS_CENTS_THRESHOLD") {
            Ok(raw) => parse_price_rule(&raw)?,
            Err(_) => PriceRule::cents_at_or_above(DEFAULT_CENTS_THRESHOLD),
        };

        Ok(Self {
            api_url,
            placeholder_image,
            price_rule,
        })
    }

    /// Points the catalog at another feed, with the same check as `PRODUCTS_API_URL`.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Result<Self, ConfigError> {
        self.api_url = checked_api_url(api_url.into())?;
        Ok(self)
    }
}

fn checked_api_url(api_url: String) -> Result<String, ConfigError> {
    if api_url.starts_with("http://") || api_url.starts_with("https://") {
        Ok(api_url)
    } else {
        Err(ConfigError::InvalidApiUrl { value: api_url })
    }
}

fn parse_price_rule(raw: &str) -> Result<PriceRule, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("off") || trimmed.eq_ignore_ascii_case("none") {
        return Ok(PriceRule::disabled());
    }

    match trimmed.parse::<f64>() {
        Ok(threshold) if threshold.is_finite() && threshold > 0.0 => {
            Ok(PriceRule::cents_at_or_above(threshold))
        }
        _ => Err(ConfigError::InvalidCentsThreshold {
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidApiUrl { value: String },
    InvalidCentsThreshold { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidApiUrl { value } => {
                write!(f, "PRODUCTS_API_URL must be an http(s) URL, got '{value}'")
            }
            ConfigError::InvalidCentsThreshold { value } => write!(
                f,
                "PRODUCTS_CENTS_THRESHOLD must be a positive number or 'off', got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidApiUrl { .. }
            | ConfigError::InvalidCentsThreshold { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("PRODUCTS_API_URL");
        env::remove_var("PRODUCTS_PLACEHOLDER_IMAGE");
        env::remove_var("PRODUCTS_CENTS_THRESHOLD");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.catalog, CatalogConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn catalog_overrides_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRODUCTS_API_URL", "http://127.0.0.1:9000/products");
        env::set_var("PRODUCTS_PLACEHOLDER_IMAGE", "https://cdn.example.com/none.png");
        env::set_var("PRODUCTS_CENTS_THRESHOLD", "5000");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.catalog.api_url, "http://127.0.0.1:9000/products");
        assert_eq!(
            config.catalog.placeholder_image,
            "https://cdn.example.com/none.png"
        );
        assert_eq!(config.catalog.price_rule, PriceRule::cents_at_or_above(5000.0));
        reset_env();
    }

    #[test]
    fn cents_threshold_can_be_disabled() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRODUCTS_CENTS_THRESHOLD", "off");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.catalog.price_rule, PriceRule::disabled());
        reset_env();
    }

    #[test]
    fn rejects_invalid_catalog_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRODUCTS_CENTS_THRESHOLD", "-3");
        let err = AppConfig::load().expect_err("negative threshold rejected");
        assert!(matches!(err, ConfigError::InvalidCentsThreshold { .. }));

        reset_env();
        env::set_var("PRODUCTS_API_URL", "ftp://example.com/products");
        let err = AppConfig::load().expect_err("non-http url rejected");
        assert!(err.to_string().contains("ftp://example.com/products"));
        reset_env();
    }

    #[test]
    fn api_url_override_is_checked() {
        let catalog = CatalogConfig::default()
            .with_api_url("https://shop.test/products")
            .expect("https url accepted");
        assert_eq!(catalog.api_url, "https://shop.test/products");

        let err = CatalogConfig::default()
            .with_api_url("shop.test/products")
            .expect_err("scheme-less url rejected");
        assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
    }
}
