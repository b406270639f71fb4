use crate::infra::CatalogHandle;
use clap::{Args, ValueEnum};
use product_dashboard::catalog::{load_dashboard, load_products, render_page, ProductContainer};
use product_dashboard::config::AppConfig;
use product_dashboard::error::AppError;
use product_dashboard::telemetry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Only the product container element
    #[default]
    Html,
    /// A complete HTML document
    Page,
    /// Normalized products as JSON
    Json,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ProductsArgs {
    /// Output shape written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub(crate) format: OutputFormat,
    /// Override the configured product feed URL
    #[arg(long)]
    pub(crate) url: Option<String>,
}

pub(crate) async fn run_products(args: ProductsArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(url) = args.url {
        config.catalog = config.catalog.with_api_url(url)?;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = CatalogHandle::from_config(&config.catalog);
    let output = render_products(&catalog, args.format).await?;
    println!("{output}");
    Ok(())
}

/// Produces the text printed by the `products` command. On failure the HTML
/// formats write the banner markup to stderr before returning the error.
pub(crate) async fn render_products(
    catalog: &CatalogHandle,
    format: OutputFormat,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => {
            let products =
                load_products(catalog.source.clone(), catalog.normalizer.clone()).await?;
            let json = serde_json::to_string_pretty(&products)
                .map_err(|err| AppError::Io(err.into()))?;
            Ok(json)
        }
        OutputFormat::Html | OutputFormat::Page => {
            let (container, outcome) = load_dashboard(
                catalog.source.clone(),
                catalog.normalizer.clone(),
                ProductContainer::mounted(),
            )
            .await;

            let html = if format == OutputFormat::Page {
                render_page(&container)
            } else {
                container.to_html()
            };

            match outcome {
                Ok(_) => Ok(html),
                Err(err) => {
                    eprintln!("{html}");
                    Err(err.into())
                }
            }
        }
    }
}
