use anyhow::Result;
use gcal_mcp::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
