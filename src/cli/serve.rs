use anyhow::Result;

use crate::core::{AppConfig, logging};
use crate::mcp;

pub async fn run() -> Result<()> {
    logging::init(&logging::crate_directives());
    let config = AppConfig::from_env()?;
    config.log_redacted();
    mcp::serve(&config).await
}
