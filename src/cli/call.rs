use std::sync::Arc;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::core::{AppConfig, ToolError, logging};
use crate::google::gcal::GoogleCalendar;
use crate::tools::CalendarTools;

/// Parse the optional JSON argument given on the command line.
fn parse_args(raw: Option<&str>) -> Result<Map<String, Value>, ToolError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(args)) => Ok(args),
        Ok(_) => Err(ToolError::invalid("args", "expected a JSON object")),
        Err(e) => Err(ToolError::invalid("args", e.to_string())),
    }
}

pub async fn run(operation: &str, raw_args: Option<&str>) -> Result<()> {
    logging::init("warn");
    let args = parse_args(raw_args)?;
    let config = AppConfig::from_env()?;

    let calendar = GoogleCalendar::new(&config)?;
    let tools = CalendarTools::new(Arc::new(calendar), config.timezone.clone());
    let output = tools.call(operation, Some(&args)).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_treats_missing_args_as_empty() {
        assert!(parse_args(None).unwrap().is_empty());
        assert!(parse_args(Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn it_parses_an_object() {
        let args = parse_args(Some(r#"{"maxResults": 3}"#)).unwrap();
        assert_eq!(args["maxResults"], 3);
    }

    #[test]
    fn it_rejects_non_objects() {
        let err = parse_args(Some("[1]")).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput { field, .. } if field == "args"));
    }
}
