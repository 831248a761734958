//! Raw history document
//!
//! A user's history as three untyped JSON collections (`workouts`, `meals`,
//! `sleeps`). Records are kept as `serde_json::Value` until the normalizer
//! validates them, so a malformed record never fails the whole document.

use crate::error::InsightError;
use crate::types::EventKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw collections for one user, exactly as fetched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistory {
    #[serde(default, deserialize_with = "lenient_collection")]
    pub workouts: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_collection")]
    pub meals: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_collection")]
    pub sleeps: Vec<Value>,
    /// Collections whose fetch failed; each of them is empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sources: Vec<EventKind>,
}

impl RawHistory {
    /// Parse a `{"workouts": [...], "meals": [...], "sleeps": [...]}` document.
    ///
    /// Missing keys and `null` collections are treated as empty.
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(InsightError::ParseError(
                "history document must be a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn collection(&self, kind: EventKind) -> &[Value] {
        match kind {
            EventKind::Workout => &self.workouts,
            EventKind::Meal => &self.meals,
            EventKind::Sleep => &self.sleeps,
        }
    }

    pub fn set_collection(&mut self, kind: EventKind, records: Vec<Value>) {
        match kind {
            EventKind::Workout => self.workouts = records,
            EventKind::Meal => self.meals = records,
            EventKind::Sleep => self.sleeps = records,
        }
    }

    /// Record a failed fetch; the collection is cleared
    pub fn mark_failed(&mut self, kind: EventKind) {
        self.set_collection(kind, Vec::new());
        if !self.failed_sources.contains(&kind) {
            self.failed_sources.push(kind);
            self.failed_sources.sort();
        }
    }

    pub fn total_records(&self) -> usize {
        self.workouts.len() + self.meals.len() + self.sleeps.len()
    }
}

/// Accept an array of records; anything else becomes an empty collection
fn lenient_collection<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(kind = json_type(&other), "collection is not an array, treating as empty");
            Vec::new()
        }
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
