use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Title used when a failure carries no usable response body.
pub const DEFAULT_ERROR_TITLE: &str = "Something went wrong";

/// Normalized error returned by [`crate::UnauthenticatedClient`].
///
/// Holds the failure response body as-is, or
/// `{ "title": "Something went wrong" }` when there was none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorEnvelope(JsonValue);

impl ErrorEnvelope {
    pub fn new(body: JsonValue) -> Self {
        Self(body)
    }

    pub fn fallback() -> Self {
        Self(json!({ "title": DEFAULT_ERROR_TITLE }))
    }

    /// Builds an envelope from a raw failure response body.
    ///
    /// JSON bodies are kept structurally, anything else becomes a JSON
    /// string. Empty bodies and falsy JSON values fall back.
    pub fn from_body(body: &str) -> Self {
        let parsed = serde_json::from_str::<JsonValue>(body)
            .unwrap_or_else(|_| JsonValue::String(body.to_owned()));
        if is_falsy(&parsed) {
            Self::fallback()
        } else {
            Self(parsed)
        }
    }

    /// `title` field, when the envelope is an object carrying one.
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(JsonValue::as_str)
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_inner(self) -> JsonValue {
        self.0
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.title() {
            Some(title) => f.write_str(title),
            None => write!(f, "{}", self.0),
        }
    }
}

impl std::error::Error for ErrorEnvelope {}

fn is_falsy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(flag) => !flag,
        JsonValue::Number(number) => number.as_f64() == Some(0.0),
        JsonValue::String(text) => text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ErrorEnvelope, DEFAULT_ERROR_TITLE};

    #[test]
    fn json_body_is_used_as_is() {
        let envelope = ErrorEnvelope::from_body(r#"{"code":"X"}"#);
        assert_eq!(envelope.as_json(), &json!({"code": "X"}));
        assert_eq!(envelope.title(), None);
    }

    #[test]
    fn plain_text_body_becomes_string() {
        let envelope = ErrorEnvelope::from_body("Bad Gateway");
        assert_eq!(envelope.into_inner(), json!("Bad Gateway"));
    }

    #[test]
    fn empty_and_falsy_bodies_fall_back() {
        for body in ["", "null", "false", "0", "\"\""] {
            let envelope = ErrorEnvelope::from_body(body);
            assert_eq!(envelope, ErrorEnvelope::fallback(), "body: {body:?}");
        }
    }

    #[test]
    fn fallback_has_default_title() {
        let envelope = ErrorEnvelope::fallback();
        assert_eq!(envelope.title(), Some(DEFAULT_ERROR_TITLE));
        assert_eq!(envelope.to_string(), DEFAULT_ERROR_TITLE);
    }

    #[test]
    fn serializes_transparently() {
        let envelope = ErrorEnvelope::new(json!({"title": "Nope", "field": 1}));
        let encoded = serde_json::to_value(&envelope).expect("must serialize");
        assert_eq!(encoded, json!({"title": "Nope", "field": 1}));
    }
}
