//! Request payload parsing and field validation.
//!
//! Clients send loosely typed JSON. Only the allow-listed keys below are read;
//! everything else in the body (ids, timestamps, unknown keys) is ignored.
//! String inputs are trimmed and an empty string counts as absent.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::task::{NewTask, TaskChanges, TITLE_MAX_CHARS};

/// Raw body of a create or update request.
///
/// Each field distinguishes "key absent" (`None`) from "key present" (`Some`,
/// including `Some(Value::Null)`).
#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All rule failures for one request, in the order the rules were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

/// Wire shape of a validation failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationBody {
    pub message: String,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: String) {
        self.errors.push(FieldError { field, message });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages grouped by field name.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for e in &self.errors {
            map.entry(e.field.to_string()).or_default().push(e.message.clone());
        }
        map
    }

    /// First message, with a count of the remaining ones.
    pub fn summary(&self) -> String {
        match self.errors.split_first() {
            None => "The given data was invalid.".to_string(),
            Some((first, [])) => first.message.clone(),
            Some((first, rest)) => format!(
                "{} (and {} more error{})",
                first.message,
                rest.len(),
                if rest.len() == 1 { "" } else { "s" }
            ),
        }
    }

    pub fn to_body(&self) -> ValidationBody {
        ValidationBody { message: self.summary(), errors: self.by_field() }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trim a string and map "" to `None`. Non-strings pass through untouched.
fn normalise(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() { None } else { Some(Value::String(t.to_string())) }
        }
        Some(other) => Some(other.clone()),
    }
}

fn check_title(payload: &TaskPayload, errors: &mut ValidationErrors) -> Option<String> {
    match normalise(payload.title.as_ref()) {
        None => {
            errors.push("title", "The title field is required.".into());
            None
        }
        Some(Value::String(s)) => {
            if s.chars().count() > TITLE_MAX_CHARS {
                errors.push(
                    "title",
                    format!("The title field must not be greater than {TITLE_MAX_CHARS} characters."),
                );
                None
            } else {
                Some(s)
            }
        }
        Some(_) => {
            errors.push("title", "The title field must be a string.".into());
            None
        }
    }
}

/// `None` when the key was absent, `Some(None)` when it was null or blank.
fn check_description(payload: &TaskPayload, errors: &mut ValidationErrors) -> Option<Option<String>> {
    payload.description.as_ref()?;
    match normalise(payload.description.as_ref()) {
        None => Some(None),
        Some(Value::String(s)) => Some(Some(s)),
        Some(_) => {
            errors.push("description", "The description field must be a string.".into());
            None
        }
    }
}

fn check_completed(payload: &TaskPayload, errors: &mut ValidationErrors) -> Option<bool> {
    let parsed = match payload.completed.as_ref()? {
        Value::Null => return None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "0" | "false" => Some(false),
            "1" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    };
    if parsed.is_none() {
        errors.push("completed", "The completed field must be true or false.".into());
    }
    parsed
}

/// Validate a create request. `completed` is not writable on create.
pub fn validate_create(payload: &TaskPayload) -> Result<NewTask, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = check_title(payload, &mut errors);
    let description = check_description(payload, &mut errors);
    match title {
        Some(title) if errors.is_empty() => Ok(NewTask { title, description: description.flatten() }),
        _ => Err(errors),
    }
}

/// Validate an update request.
pub fn validate_update(payload: &TaskPayload) -> Result<TaskChanges, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = check_title(payload, &mut errors);
    let description = check_description(payload, &mut errors);
    let completed = check_completed(payload, &mut errors);
    match title {
        Some(title) if errors.is_empty() => Ok(TaskChanges { title, description, completed }),
        _ => Err(errors),
    }
}
