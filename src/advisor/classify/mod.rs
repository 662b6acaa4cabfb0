
use serde_json::Value;

/// Outcome of reading the verifier model's reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Parsed(bool),
    Unparseable,
}

/// Interpret a `{"is_relevant": bool}` reply, tolerating a surrounding code fence.
///
/// A JSON object without the key counts as not relevant. A present key is read by
/// truthiness, so `null`, `0`, `""`, `[]` and `{}` mean not relevant. Replies that are
/// not a JSON object are [`Classification::Unparseable`].
#[inline]
pub fn parse_classification(content: &str) -> Classification {
    let text = strip_code_fence(content);

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => match map.get("is_relevant") {
            None => Classification::Parsed(false),
            Some(value) => Classification::Parsed(is_truthy(value)),
        },
        Ok(_) | Err(_) => Classification::Unparseable,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Take the body of the first fenced block, dropping an optional `json` tag
fn strip_code_fence(content: &str) -> &str {
    let text = content.trim();
    if !text.starts_with("```") {
        return text;
    }

    let body = text.split("```").nth(1).unwrap_or_default();
    body.strip_prefix("json").unwrap_or(body).trim()
}
