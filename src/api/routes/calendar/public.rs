//! Public types for the calendar API
use serde::Deserialize;
use serde_json::{Map, Value};

/// Query string accepted by `GET /api/calendar/events`
#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    #[serde(rename = "timeMin")]
    pub time_min: Option<String>,
    #[serde(rename = "timeMax")]
    pub time_max: Option<String>,
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
}

impl ListEventsParams {
    /// Convert to tool arguments. `maxResults` becomes a number when it
    /// parses as one so the usual validation applies.
    pub fn into_args(self) -> Map<String, Value> {
        let mut args = Map::new();
        if let Some(time_min) = self.time_min {
            args.insert("timeMin".into(), Value::String(time_min));
        }
        if let Some(time_max) = self.time_max {
            args.insert("timeMax".into(), Value::String(time_max));
        }
        if let Some(max_results) = self.max_results {
            let value = max_results
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(max_results));
            args.insert("maxResults".into(), value);
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_converts_query_params_to_tool_args() {
        let params = ListEventsParams {
            time_min: Some("2024-05-01T00:00:00Z".into()),
            time_max: None,
            max_results: Some("25".into()),
        };
        assert_eq!(
            Value::Object(params.into_args()),
            json!({"timeMin": "2024-05-01T00:00:00Z", "maxResults": 25})
        );
    }

    #[test]
    fn it_keeps_unparsable_max_results_as_text() {
        let params = ListEventsParams {
            max_results: Some("lots".into()),
            ..Default::default()
        };
        assert_eq!(Value::Object(params.into_args()), json!({"maxResults": "lots"}));
    }
}
