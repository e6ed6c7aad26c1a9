mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use entry_requirements::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
