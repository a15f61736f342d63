/*
 * Responsibility
 * - Start the tokio runtime and hand off to app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    shopease_api::app::run().await
}
