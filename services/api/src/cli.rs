use crate::products::{run_products, ProductsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use product_dashboard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Product Dashboard",
    about = "Serve or print a dashboard of products fetched from a storefront feed",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Fetch the product feed once and print the rendered result
    Products(ProductsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Products(args) => run_products(args).await,
    }
}
