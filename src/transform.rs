//! Request body pipeline.
//!
//! Steps run in order on the [`Value`] body, then the pipeline hands the
//! result to the JSON encoder, which is always the last step.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::{ClientError, Result, Value};

/// Numeric-offset ISO-8601 layout, e.g. `2024-03-01T10:00:00+02:00`.
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Single body transformation step.
pub type BodyTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Formats a date as `YYYY-MM-DDTHH:mm:ss±HH:MM`.
///
/// The offset is always numeric; UTC renders as `+00:00`, never `Z`.
pub fn format_date(date: &DateTime<FixedOffset>, offset: Option<FixedOffset>) -> String {
    match offset {
        Some(offset) => date.with_timezone(&offset).format(DATE_FORMAT).to_string(),
        None => date.format(DATE_FORMAT).to_string(),
    }
}

/// Replaces every date in `value`, at any depth, with its string form.
///
/// Arrays keep order and length, objects keep all of their keys in order and
/// every other value is returned unchanged.
pub fn normalize_dates(value: Value, offset: Option<FixedOffset>) -> Value {
    match value {
        Value::Date(date) => Value::String(format_date(&date, offset)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| normalize_dates(item, offset))
                .collect(),
        ),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key, normalize_dates(item, offset)))
                .collect(),
        ),
        other => other,
    }
}

/// Ordered body transformers applied before the request is sent.
#[derive(Clone, Default)]
pub struct TransformPipeline {
    steps: Vec<BodyTransform>,
}

impl fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl TransformPipeline {
    /// Pipeline with no steps; bodies are only JSON-encoded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline whose first step is [`normalize_dates`].
    pub fn with_date_normalization(offset: Option<FixedOffset>) -> Self {
        let mut pipeline = Self::new();
        pipeline.push(move |value| normalize_dates(value, offset));
        pipeline
    }

    /// Appends a step after the existing ones.
    pub fn push<F>(&mut self, step: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(step));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs all steps in order.
    pub fn apply(&self, value: Value) -> Value {
        self.steps.iter().fold(value, |value, step| step(value))
    }

    /// Runs all steps, then encodes the result as JSON.
    pub fn encode(&self, value: Value) -> Result<Vec<u8>> {
        let value = self.apply(value);
        serde_json::to_vec(&value).map_err(|err| ClientError::Encode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};
    use serde_json::json;

    use super::{format_date, normalize_dates, TransformPipeline};
    use crate::Value;

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3_600).expect("valid offset")
    }

    fn sample_date() -> Value {
        Value::date(
            plus_two()
                .with_ymd_and_hms(2024, 3, 1, 10, 15, 30)
                .single()
                .expect("valid date"),
        )
    }

    #[test]
    fn formats_with_numeric_offset() {
        let date = plus_two()
            .with_ymd_and_hms(2024, 3, 1, 10, 15, 30)
            .single()
            .expect("valid date");
        assert_eq!(format_date(&date, None), "2024-03-01T10:15:30+02:00");
    }

    #[test]
    fn utc_renders_as_zero_offset_not_z() {
        let date = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 59, 59)
            .single()
            .expect("valid date")
            .fixed_offset();
        assert_eq!(format_date(&date, None), "2024-12-31T23:59:59+00:00");
    }

    #[test]
    fn converts_into_requested_offset() {
        let date = plus_two()
            .with_ymd_and_hms(2024, 3, 1, 0, 30, 0)
            .single()
            .expect("valid date");
        let india = FixedOffset::east_opt(5 * 3_600 + 30 * 60).expect("valid offset");
        let west = FixedOffset::west_opt(5 * 3_600).expect("valid offset");

        assert_eq!(format_date(&date, Some(india)), "2024-03-01T04:00:00+05:30");
        assert_eq!(format_date(&date, Some(west)), "2024-02-29T17:30:00-05:00");
    }

    #[test]
    fn normalizes_dates_at_every_depth() {
        let body = Value::object([
            ("id", Value::from(7)),
            ("createdAt", sample_date()),
            (
                "slots",
                Value::array([sample_date(), Value::Null, Value::text("keep")]),
            ),
            (
                "meta",
                Value::object([
                    ("flag", Value::from(false)),
                    ("nested", Value::object([("until", sample_date())])),
                ]),
            ),
        ]);

        let normalized = normalize_dates(body, None);
        let encoded = serde_json::to_value(&normalized).expect("must serialize");

        assert_eq!(
            encoded,
            json!({
                "id": 7,
                "createdAt": "2024-03-01T10:15:30+02:00",
                "slots": ["2024-03-01T10:15:30+02:00", null, "keep"],
                "meta": {
                    "flag": false,
                    "nested": { "until": "2024-03-01T10:15:30+02:00" }
                }
            })
        );
    }

    #[test]
    fn normalization_preserves_key_order() {
        let body = Value::object([
            ("b", sample_date()),
            ("a", Value::from(1)),
            ("c", Value::array([sample_date()])),
        ]);

        match normalize_dates(body, None) {
            Value::Object(entries) => {
                let keys: Vec<_> = entries.iter().map(|(key, _)| key.as_str()).collect();
                assert_eq!(keys, ["b", "a", "c"]);
            }
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn date_free_body_is_unchanged() {
        let body = Value::from(json!({
            "name": "Kit",
            "scores": [1, 2.5, null],
            "profile": {"active": true, "tags": []}
        }));

        let once = normalize_dates(body.clone(), None);
        assert_eq!(once, body);
        assert_eq!(normalize_dates(once, None), body);
    }

    #[test]
    fn top_level_date_and_scalars() {
        assert_eq!(
            normalize_dates(sample_date(), None),
            Value::text("2024-03-01T10:15:30+02:00")
        );
        assert_eq!(normalize_dates(Value::from(3), None), Value::from(3));
        assert_eq!(normalize_dates(Value::Null, None), Value::Null);
    }

    #[test]
    fn pipeline_runs_steps_in_order_before_encoding() {
        let mut pipeline = TransformPipeline::with_date_normalization(None);
        pipeline.push(|value| match value {
            Value::String(text) => Value::String(format!("{text}!")),
            other => other,
        });
        assert_eq!(pipeline.len(), 2);

        let encoded = pipeline.encode(sample_date()).expect("must encode");
        assert_eq!(encoded, br#""2024-03-01T10:15:30+02:00!""#.to_vec());
    }

    #[test]
    fn empty_pipeline_only_encodes() {
        let pipeline = TransformPipeline::new();
        assert!(pipeline.is_empty());

        let encoded = pipeline
            .encode(Value::object([("at", sample_date())]))
            .expect("must encode");
        assert_eq!(encoded, br#"{"at":"2024-03-01T08:15:30.000Z"}"#.to_vec());
    }
}
