mod cli;
mod infra;
mod products;
mod routes;
mod server;

use product_dashboard::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
