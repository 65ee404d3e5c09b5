use anyhow::Result;

use crate::tools::definitions;

pub fn run() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&definitions())?);
    Ok(())
}
