//! Jaeger span model.
//!
//! Field names follow the Jaeger JSON wire format (`spanID`, `operationName`,
//! ...). Durations and timestamps are microseconds.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A tag or log field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
}

impl TagValue {
    /// Returns the value as a string reference if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for boolean `true` or the string `"true"`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => s == "true",
            Self::Int(_) | Self::Float(_) => false,
        }
    }

    /// Reads the value as an integer the way a lenient parser would.
    ///
    /// Numbers are truncated and strings are read up to the first
    /// non-digit, so `"503 Service Unavailable"` yields 503.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::String(s) => leading_integer(s),
            Self::Float(_) | Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for TagValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for TagValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for TagValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = s.strip_prefix('-').map_or_else(
        || (false, s.strip_prefix('+').unwrap_or(s)),
        |rest| (true, rest),
    );
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: i64 = rest[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// A key/value attribute on a span or log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Attribute key, e.g. `http.method`.
    pub key: String,
    /// Attribute value.
    pub value: TagValue,
}

impl Tag {
    /// Creates a new tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A timestamped event recorded within a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Microseconds since the Unix epoch.
    pub timestamp: u64,
    /// Event fields.
    #[serde(default)]
    pub fields: Vec<Tag>,
}

impl LogEvent {
    /// Creates a log event from its fields.
    #[must_use]
    pub const fn new(timestamp: u64, fields: Vec<Tag>) -> Self {
        Self { timestamp, fields }
    }

    /// Returns the first field with the given key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&TagValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    /// Returns true if any field has the given key.
    #[must_use]
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }
}

/// Relationship between two spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefType {
    /// The referenced span is the parent.
    ChildOf,
    /// The referenced span causally precedes this one.
    FollowsFrom,
}

/// A reference from one span to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanReference {
    /// Kind of reference.
    #[serde(rename = "refType")]
    pub ref_type: RefType,
    /// Trace of the referenced span.
    #[serde(rename = "traceID")]
    pub trace_id: String,
    /// Referenced span.
    #[serde(rename = "spanID")]
    pub span_id: String,
}

/// Process that emitted a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    /// Service name reported by the process.
    pub service_name: String,
    /// Process-level tags (hostname, client version, ...).
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A single span as returned by the Jaeger query API.
///
/// Deserialization is lenient: identifiers, names and the start time default
/// when absent so that partial span data can still be analyzed. Use
/// [`SpanRecord::from_value`] for strict validation of caller input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    /// Span identifier.
    #[serde(rename = "spanID", default)]
    pub span_id: String,
    /// Trace identifier.
    #[serde(rename = "traceID", default)]
    pub trace_id: String,
    /// Operation name, e.g. `HTTP GET /api/users`.
    #[serde(default)]
    pub operation_name: String,
    /// Service that produced the span.
    #[serde(default)]
    pub service_name: String,
    /// Start time in microseconds since the Unix epoch.
    #[serde(default)]
    pub start_time: u64,
    /// Duration in microseconds.
    #[serde(default)]
    pub duration: u64,
    /// Span tags, in emission order. Keys may repeat.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Log events, in emission order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogEvent>>,
    /// References to other spans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<SpanReference>>,
    /// Emitting process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
}

impl SpanRecord {
    /// Creates a span with the given identity and no tags.
    #[must_use]
    pub fn new(
        span_id: impl Into<String>,
        trace_id: impl Into<String>,
        operation_name: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            span_id: span_id.into(),
            trace_id: trace_id.into(),
            operation_name: operation_name.into(),
            service_name: service_name.into(),
            start_time: 0,
            duration: 0,
            tags: Vec::new(),
            logs: None,
            references: None,
            process: None,
        }
    }

    /// Parses and validates a span supplied by a caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an object, if `spanID`,
    /// `traceID`, `operationName` or `serviceName` is missing or empty, if
    /// `duration` is not a non-negative integer, or if `tags` is not a
    /// sequence.
    pub fn from_value(value: Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::invalid("span", "expected a JSON object"));
        };

        for field in ["spanID", "traceID", "operationName", "serviceName"] {
            match object.get(field) {
                Some(Value::String(s)) if !s.is_empty() => {}
                _ => return Err(Error::MissingField(field)),
            }
        }

        match object.get("duration") {
            Some(Value::Number(n)) if n.is_u64() => {}
            Some(Value::Number(_)) => {
                return Err(Error::invalid(
                    "duration",
                    "must be a non-negative integer number of microseconds",
                ))
            }
            _ => return Err(Error::MissingField("duration")),
        }

        match object.get("tags") {
            Some(Value::Array(_)) => {}
            Some(_) => return Err(Error::invalid("tags", "expected a sequence of tags")),
            None => return Err(Error::MissingField("tags")),
        }

        serde_json::from_value(value).map_err(|e| Error::invalid("span", e.to_string()))
    }

    /// Checks that identifiers and names are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("spanID", &self.span_id),
            ("traceID", &self.trace_id),
            ("operationName", &self.operation_name),
            ("serviceName", &self.service_name),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(Error::MissingField(field));
            }
        }
        Ok(())
    }

    /// Sets the start time in microseconds.
    #[must_use]
    pub const fn with_start_time(mut self, start_time: u64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets the duration in microseconds.
    #[must_use]
    pub const fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    /// Appends a tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Appends a log event.
    #[must_use]
    pub fn with_log(mut self, log: LogEvent) -> Self {
        self.logs.get_or_insert_with(Vec::new).push(log);
        self
    }

    /// Appends a reference to another span.
    #[must_use]
    pub fn with_reference(mut self, ref_type: RefType, trace_id: &str, span_id: &str) -> Self {
        self.references
            .get_or_insert_with(Vec::new)
            .push(SpanReference {
                ref_type,
                trace_id: trace_id.to_string(),
                span_id: span_id.to_string(),
            });
        self
    }

    /// Returns the value of the first tag with the given key.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.iter().find(|t| t.key == key).map(|t| &t.value)
    }

    /// Returns true if any tag has the given key.
    #[must_use]
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|t| t.key == key)
    }

    /// Returns the log events, or an empty slice.
    #[must_use]
    pub fn logs(&self) -> &[LogEvent] {
        self.logs.as_deref().unwrap_or_default()
    }

    /// Returns the parent span ID from the first `CHILD_OF` reference.
    #[must_use]
    pub fn parent_span_id(&self) -> Option<&str> {
        self.references
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|r| r.ref_type == RefType::ChildOf)
            .map(|r| r.span_id.as_str())
    }

    /// Duration in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_ms(&self) -> f64 {
        self.duration as f64 / 1000.0
    }

    /// Start time as a UTC timestamp, if representable.
    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.start_time)
            .ok()
            .and_then(DateTime::from_timestamp_micros)
    }

    /// Formats the duration as `850μs`, `45.00ms` or `3.50s`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn format_duration(&self) -> String {
        let micros = self.duration;
        if micros < 1_000 {
            format!("{micros}μs")
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn valid_json() -> Value {
        json!({
            "spanID": "abc123",
            "traceID": "trace-456",
            "operationName": "HTTP GET /api/users",
            "serviceName": "frontend-service",
            "startTime": 1_675_234_567_000_000_u64,
            "duration": 45000,
            "tags": [
                {"key": "http.method", "value": "GET"},
                {"key": "http.status_code", "value": 200},
                {"key": "error", "value": false}
            ],
            "logs": [
                {
                    "timestamp": 1_675_234_567_010_000_u64,
                    "fields": [{"key": "event", "value": "sent"}]
                }
            ],
            "references": [
                {"refType": "CHILD_OF", "traceID": "trace-456", "spanID": "root"}
            ]
        })
    }

    #[test]
    fn parses_jaeger_json() {
        let span = SpanRecord::from_value(valid_json()).unwrap();

        assert_eq!(span.span_id, "abc123");
        assert_eq!(span.duration, 45000);
        assert_eq!(span.tag("http.method"), Some(&TagValue::from("GET")));
        assert_eq!(span.tag("http.status_code"), Some(&TagValue::Int(200)));
        assert_eq!(span.tag("error"), Some(&TagValue::Bool(false)));
        assert_eq!(span.logs().len(), 1);
        assert_eq!(span.parent_span_id(), Some("root"));
        assert!(span.validate().is_ok());
    }

    #[test]
    fn rejects_missing_identity_fields() {
        for field in ["spanID", "traceID", "operationName", "serviceName"] {
            let mut value = valid_json();
            value.as_object_mut().unwrap().remove(field);
            assert_eq!(
                SpanRecord::from_value(value),
                Err(Error::MissingField(field))
            );
        }
    }

    #[test]
    fn rejects_non_numeric_duration() {
        let mut value = valid_json();
        value["duration"] = json!("45ms");
        assert_eq!(
            SpanRecord::from_value(value),
            Err(Error::MissingField("duration"))
        );

        let mut value = valid_json();
        value["duration"] = json!(-5);
        assert!(matches!(
            SpanRecord::from_value(value),
            Err(Error::InvalidField {
                field: "duration",
                ..
            })
        ));
    }

    #[test]
    fn rejects_tags_that_are_not_a_sequence() {
        let mut value = valid_json();
        value["tags"] = json!({"http.method": "GET"});
        assert!(matches!(
            SpanRecord::from_value(value),
            Err(Error::InvalidField { field: "tags", .. })
        ));
    }

    #[test]
    fn rejects_non_objects() {
        assert!(SpanRecord::from_value(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn lenient_deserialization_fills_defaults() {
        let span: SpanRecord = serde_json::from_value(json!({
            "operationName": "SELECT 1",
            "duration": 1200
        }))
        .unwrap();

        assert!(span.span_id.is_empty());
        assert!(span.tags.is_empty());
        assert!(span.logs().is_empty());
        assert_eq!(span.validate(), Err(Error::MissingField("spanID")));
    }

    #[test]
    fn first_tag_wins() {
        let span = SpanRecord::new("s", "t", "op", "svc")
            .with_tag("http.status_code", 200i64)
            .with_tag("http.status_code", 500i64);
        assert_eq!(span.tag("http.status_code"), Some(&TagValue::Int(200)));
    }

    #[test]
    fn tag_value_integer_reading() {
        assert_eq!(TagValue::from(503i64).as_integer(), Some(503));
        assert_eq!(TagValue::from("500").as_integer(), Some(500));
        assert_eq!(TagValue::from(" 502 Bad Gateway").as_integer(), Some(502));
        assert_eq!(TagValue::from(500.9).as_integer(), Some(500));
        assert_eq!(TagValue::from("OK").as_integer(), None);
        assert_eq!(TagValue::from(true).as_integer(), None);
    }

    #[test]
    fn tag_value_truthiness() {
        assert!(TagValue::from(true).is_true());
        assert!(TagValue::from("true").is_true());
        assert!(!TagValue::from(false).is_true());
        assert!(!TagValue::from("TRUE").is_true());
        assert!(!TagValue::from(1i64).is_true());
    }

    #[test]
    fn tag_value_display() {
        assert_eq!(TagValue::from("GET").to_string(), "GET");
        assert_eq!(TagValue::from(200i64).to_string(), "200");
        assert_eq!(TagValue::from(false).to_string(), "false");
        assert_eq!(TagValue::from(45.0).to_string(), "45");
    }

    #[test]
    fn duration_helpers() {
        let span = SpanRecord::new("s", "t", "op", "svc").with_duration(850);
        assert_eq!(span.format_duration(), "850μs");

        let span = span.with_duration(45_000);
        assert!((span.duration_ms() - 45.0).abs() < f64::EPSILON);
        assert_eq!(span.format_duration(), "45.00ms");

        let span = span.with_duration(3_500_000);
        assert_eq!(span.format_duration(), "3.50s");
    }

    #[test]
    fn start_time_converts_to_utc() {
        let span = SpanRecord::new("s", "t", "op", "svc").with_start_time(1_675_234_567_000_000);
        let start = span.start_time().unwrap();
        assert_eq!(start.timestamp(), 1_675_234_567);
    }

    #[test]
    fn reference_types_use_jaeger_names() {
        let json = serde_json::to_string(&RefType::FollowsFrom).unwrap();
        assert_eq!(json, "\"FOLLOWS_FROM\"");
    }

    #[test]
    fn optional_sections_are_omitted() {
        let span = SpanRecord::new("s", "t", "op", "svc").with_tag("error", true);
        insta::assert_snapshot!(
            serde_json::to_string(&span).unwrap(),
            @r#"{"spanID":"s","traceID":"t","operationName":"op","serviceName":"svc","startTime":0,"duration":0,"tags":[{"key":"error","value":true}]}"#
        );
    }

    proptest! {
        #[test]
        fn leading_integer_matches_number_prefix(
            n in any::<i32>(),
            suffix in "[a-zA-Z ]{0,6}",
        ) {
            let value = TagValue::from(format!("{n}{suffix}"));
            prop_assert_eq!(value.as_integer(), Some(i64::from(n)));
        }

        #[test]
        fn format_duration_picks_one_unit(micros in any::<u32>()) {
            let formatted = SpanRecord::new("s", "t", "op", "svc")
                .with_duration(u64::from(micros))
                .format_duration();
            let unit = if micros < 1_000 {
                "μs"
            } else if micros < 1_000_000 {
                "ms"
            } else {
                "s"
            };
            let number = formatted.strip_suffix(unit).unwrap();
            prop_assert!(number.parse::<f64>().is_ok(), "{}", formatted);
        }
    }
}
