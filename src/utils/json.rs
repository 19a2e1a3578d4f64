// src/utils/json.rs

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Matches a fenced code block, optionally tagged `json`.
static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid fenced block regex")
});

/// Best-effort extraction of a JSON document from model output.
///
/// Accepts, in order: the whole text as JSON, the first fenced code block,
/// and the widest `{ ... }` or `[ ... ]` span in the text.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(block) = FENCED_BLOCK.captures(trimmed).and_then(|c| c.get(1)) {
        if let Ok(value) = serde_json::from_str::<Value>(block.as_str()) {
            return Some(value);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                    return Some(value);
                }
            }
        }
    }

    None
}

/// Unwraps a model reply into structured JSON. A string reply is searched for
/// embedded JSON; anything else is returned as is.
pub fn structured(reply: Value) -> Option<Value> {
    match reply {
        Value::String(text) => extract_json(&text),
        Value::Null => None,
        other => Some(other),
    }
}
