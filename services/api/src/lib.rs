mod cli;
mod infra;
mod routes;
mod server;
mod tools;

use property_leads::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
