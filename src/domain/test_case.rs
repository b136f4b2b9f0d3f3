use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_RUN_STATUS: &str = "Not Started";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TestRun {
    pub test_date: String,
    pub actual_result: String,
    pub status: String,
    pub bug_id: String,
    pub commit_id: String,
}

impl TestRun {
    pub fn scheduled(test_date: &str) -> Self {
        Self {
            test_date: test_date.to_string(),
            actual_result: String::new(),
            status: DEFAULT_RUN_STATUS.to_string(),
            bug_id: String::new(),
            commit_id: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub ts_id: String,
    pub tc_id: String,
    pub scenario: String,
    pub steps: String,
    pub expected_result: String,
    pub release_version: String,
    pub date_generated: String,
    pub tester_name: String,
    pub runs: Vec<TestRun>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub session_id: String,
    pub test_cases: Vec<TestCase>,
    pub release_version: String,
    pub tester_name: String,
    pub description: String,
    pub run_dates: Vec<String>,
    pub used_model: String,
}

/// Loosely-shaped test case as returned by the model. Every field is optional
/// and may hold any JSON value; the normalizer decides what counts as present.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RawTestCase {
    pub tc_id: Option<Value>,
    pub scenario: Option<Value>,
    pub title: Option<Value>,
    pub steps: Option<Value>,
    pub test_case_steps: Option<Value>,
    pub expected_result: Option<Value>,
    pub expected: Option<Value>,
}

impl RawTestCase {
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// Renders a loose JSON value as text, treating falsy values as absent.
pub fn present_text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("True".to_string()),
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ResultUpdate {
    #[serde(default, deserialize_with = "lenient_text")]
    pub tc_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_index")]
    pub run_index: i64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub actual_result: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bug_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub commit_id: Option<String>,
}

// Clients send ids as numbers as often as strings; any scalar is kept as text.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        other => Some(other.to_string()),
    })
}

// Integers, floats (truncated toward zero) and numeric strings are accepted.
fn lenient_index<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let invalid = || <D::Error as serde::de::Error>::custom("run_index must be an integer");
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Number(number) => match number.as_i64() {
            Some(index) => Ok(index),
            None => number
                .as_f64()
                .filter(|value| value.is_finite())
                .map(|value| value.trunc() as i64)
                .ok_or_else(invalid),
        },
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
