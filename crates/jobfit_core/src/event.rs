use serde::Deserialize;

use crate::model::{AgentProgressEntry, SubTaskStatus};

/// One parsed status-channel message.
///
/// Every field is optional: a field missing from the payload was not reported by
/// this message and leaves the reconciled value untouched. Heartbeats (`{}`) are
/// therefore no-ops.
///
/// Each field is decoded on its own. A value of an unexpected type is treated as
/// not reported instead of rejecting the whole message, so the status fields
/// survive a malformed result payload.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StreamEvent {
    #[serde(deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::status")]
    pub jobfit_status: Option<SubTaskStatus>,
    #[serde(deserialize_with = "lenient::status")]
    pub insights_status: Option<SubTaskStatus>,
    #[serde(deserialize_with = "lenient::score")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub result: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub strengths: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::list")]
    pub weaknesses: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::list")]
    pub areas_for_improvement: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::list")]
    pub cv_optimization_suggestions: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::list")]
    pub keywords_already_matched: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient::list")]
    pub missing_keywords_to_add: Option<Vec<String>>,
    pub company_insights: Option<serde_json::Value>,
    pub interview_prep: Option<serde_json::Value>,
    pub web_research: Option<serde_json::Value>,
    #[serde(deserialize_with = "lenient::text")]
    pub agent_stage: Option<String>,
    #[serde(deserialize_with = "lenient::progress")]
    pub agent_progress: Option<Vec<AgentProgressEntry>>,
    #[serde(deserialize_with = "lenient::text")]
    pub error: Option<String>,
}

impl StreamEvent {
    /// Parses the `data` payload of one channel message.
    ///
    /// Fails only when the payload itself is malformed. Mistyped fields are
    /// dropped individually.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// The structured error carried by this message, if populated.
    pub fn structured_error(&self) -> Option<&str> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// Per-field decoders for values produced upstream by a language model.
mod lenient {
    use jobfit_logging::jobfit_debug;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::model::{AgentProgressEntry, SubTaskStatus};

    fn raw<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?.filter(|value| !value.is_null()))
    }

    /// Blank and unknown statuses are not reported.
    pub(super) fn status<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SubTaskStatus>, D::Error> {
        Ok(match raw(deserializer)? {
            Some(Value::String(text)) => {
                let parsed = SubTaskStatus::parse(&text);
                if parsed.is_none() && !text.trim().is_empty() {
                    jobfit_debug!("ignoring unknown subtask status {:?}", text);
                }
                parsed
            }
            Some(other) => {
                jobfit_debug!("ignoring non-string subtask status {}", other);
                None
            }
            None => None,
        })
    }

    /// Accepts a number or a numeric string.
    pub(super) fn score<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Ok(match raw(deserializer)? {
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(text)) => {
                let parsed = text.trim().trim_end_matches('%').trim().parse::<f64>().ok();
                if parsed.is_none() {
                    jobfit_debug!("ignoring unparsable score {:?}", text);
                }
                parsed
            }
            Some(other) => {
                jobfit_debug!("ignoring score of unexpected type {}", other);
                None
            }
            None => None,
        })
    }

    /// Strings pass through; numbers and booleans are rendered as text.
    pub(super) fn text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match raw(deserializer)? {
            Some(Value::String(text)) => Some(text),
            Some(value @ (Value::Number(_) | Value::Bool(_))) => Some(value.to_string()),
            Some(other) => {
                jobfit_debug!("ignoring text field of unexpected type {}", other);
                None
            }
            None => None,
        })
    }

    /// String items are kept as they are; any other item is rendered as compact JSON.
    pub(super) fn list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match raw(deserializer)? {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(|item| match item {
                        Value::String(text) => text,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Some(other) => {
                jobfit_debug!("ignoring list field of unexpected type {}", other);
                None
            }
            None => None,
        })
    }

    /// Rows that do not decode are dropped; the rest are kept in order.
    pub(super) fn progress<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<AgentProgressEntry>>, D::Error> {
        Ok(match raw(deserializer)? {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            ),
            Some(other) => {
                jobfit_debug!("ignoring agent progress of unexpected type {}", other);
                None
            }
            None => None,
        })
    }
}

/// Terminal failure of a status channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFailure {
    /// The payload carried a populated `error` field.
    Structured(String),
    /// The transport failed or ended without a structured payload.
    Connection,
}

pub const CONNECTION_ERROR_MESSAGE: &str = "Connection to the analysis server was lost.";

impl StreamFailure {
    /// Text shown in place of the progress message once the channel has failed.
    pub fn status_text(&self) -> String {
        match self {
            StreamFailure::Structured(message) => format!("Error: {message}"),
            StreamFailure::Connection => CONNECTION_ERROR_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_score_is_parsed_and_statuses_survive() {
        let event = StreamEvent::from_json(
            r#"{"status":"processed","jobfit_status":"processed","insights_status":"processed","score":"85","strengths":["a"]}"#,
        )
        .unwrap();

        assert_eq!(event.score, Some(85.0));
        assert_eq!(event.jobfit_status, Some(SubTaskStatus::Processed));
        assert_eq!(event.insights_status, Some(SubTaskStatus::Processed));
        assert_eq!(event.strengths, Some(vec!["a".to_string()]));
    }

    #[test]
    fn non_string_list_items_are_rendered_as_json() {
        let event =
            StreamEvent::from_json(r#"{"jobfit_status":"processed","strengths":[{"point":"a"},"b",3]}"#)
                .unwrap();

        assert_eq!(
            event.strengths,
            Some(vec![r#"{"point":"a"}"#.to_string(), "b".to_string(), "3".to_string()])
        );
        assert_eq!(event.jobfit_status, Some(SubTaskStatus::Processed));
    }

    #[test]
    fn mistyped_fields_are_not_reported() {
        let event = StreamEvent::from_json(
            r#"{"jobfit_status":7,"insights_status":"bogus","score":{"value":1},"weaknesses":"none","agent_progress":[{"stage":"search","status":"done"},42],"status":["x"]}"#,
        )
        .unwrap();

        assert_eq!(event.jobfit_status, None);
        assert_eq!(event.insights_status, None);
        assert_eq!(event.score, None);
        assert_eq!(event.weaknesses, None);
        assert_eq!(event.status, None);
        assert_eq!(
            event.agent_progress,
            Some(vec![AgentProgressEntry {
                stage: "search".to_string(),
                status: "done".to_string(),
                items_count: None,
            }])
        );
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(StreamEvent::from_json("\"processed\"").is_err());
        assert!(StreamEvent::from_json("{not json").is_err());
    }
}
