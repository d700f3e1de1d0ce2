mod analyze;
mod cli;
mod infra;
mod routes;
mod server;

use course_lens::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
