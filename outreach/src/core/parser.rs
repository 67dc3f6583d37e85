//! Model response parsing into the sequence record

use regex::Regex;
use serde_json::{Map, Value};

use shared::MessageSequence;
use crate::error::GenerationError;

const SEQUENCE_KEYS: [&str; 4] = ["message_1", "message_2", "message_3", "subject_lines"];

/// Extracts the JSON sequence object from raw model text
pub struct ResponseParser {
    fence_regex: Regex,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            fence_regex: Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").unwrap(),
        }
    }

    /// Parse a model reply
    ///
    /// Missing keys come back as empty strings so the validator reports them;
    /// only a reply with no usable JSON object at all is malformed.
    pub fn parse(&self, text: &str) -> Result<MessageSequence, GenerationError> {
        let candidate = self.extract_json(text).ok_or_else(|| malformed("no JSON object found in response"))?;

        // First complete value only; anything after it is ignored
        let value = serde_json::Deserializer::from_str(candidate)
            .into_iter::<Value>()
            .next()
            .ok_or_else(|| malformed("no JSON object found in response"))?
            .map_err(|e| malformed(format!("invalid JSON: {e}")))?;
        let Value::Object(object) = value else {
            return Err(malformed("response JSON is not an object"));
        };

        if !SEQUENCE_KEYS.iter().any(|key| object.contains_key(*key)) {
            return Err(malformed("none of the expected sequence keys are present"));
        }

        let mut sequence = MessageSequence::new(
            text_field(&object, "message_1")?,
            text_field(&object, "message_2")?,
            text_field(&object, "message_3")?,
            text_field(&object, "subject_lines")?,
        );
        sequence.hook = hook_field(&object);
        Ok(sequence)
    }

    fn extract_json<'a>(&self, text: &'a str) -> Option<&'a str> {
        let body = match self.fence_regex.captures(text).and_then(|caps| caps.get(1)) {
            Some(fenced) => fenced.as_str(),
            None => text,
        };
        body.find('{').map(|start| &body[start..])
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

fn malformed(reason: impl Into<String>) -> GenerationError {
    GenerationError::MalformedResponse { reason: reason.into() }
}

/// String as-is, string arrays joined one per line, absent or null as empty
fn text_field(object: &Map<String, Value>, key: &str) -> Result<String, GenerationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text.trim().to_string()),
        Some(Value::Array(items)) => {
            let lines: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            Ok(lines.join("\n"))
        }
        Some(other) => Err(malformed(format!("field '{key}' has unexpected type: {other}"))),
    }
}

fn hook_field(object: &Map<String, Value>) -> Option<String> {
    match object.get("hook")? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.trim().to_string()),
        other => Some(other.to_string()),
    }
}
