//! Span analysis.
//!
//! Turns a [`SpanRecord`] into an [`ExplanationResult`]: what kind of work the
//! span represents, how its latency compares to what is typical for that
//! kind, whether it failed, and which tags are worth showing.

use lens_model::explanation::MAX_KEY_DETAILS;
use lens_model::{Assessment, ErrorInfo, ExplanationResult, Performance, SpanRecord, TagValue};
use std::fmt;
use tracing::debug;

/// Longest `db.statement` shown verbatim in key details.
const MAX_STATEMENT_CHARS: usize = 100;

/// Category of work a span represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanType {
    /// Incoming HTTP request.
    HttpServer,
    /// Outgoing HTTP request.
    HttpClient,
    /// Database or cache query.
    DatabaseQuery,
    /// gRPC call.
    GrpcCall,
    /// Anything else, labelled by the operation name.
    Operation(String),
    /// No tags matched and the operation name is empty.
    Unknown,
}

impl SpanType {
    /// Detects the span type from tags and operation name.
    pub fn detect(span: &SpanRecord) -> Self {
        if span.has_tag("http.method") {
            let is_server = span
                .tag("span.kind")
                .and_then(TagValue::as_str)
                .is_some_and(|kind| kind == "server");
            return if is_server {
                Self::HttpServer
            } else {
                Self::HttpClient
            };
        }

        if span.has_tag("db.type") || span.has_tag("db.statement") {
            return Self::DatabaseQuery;
        }

        if span.has_tag("rpc.service") || span.operation_name.to_lowercase().contains("grpc") {
            return Self::GrpcCall;
        }

        if span.operation_name.is_empty() {
            Self::Unknown
        } else {
            Self::Operation(span.operation_name.clone())
        }
    }

    /// Returns the display label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::HttpServer => "HTTP Server",
            Self::HttpClient => "HTTP Client",
            Self::DatabaseQuery => "Database Query",
            Self::GrpcCall => "gRPC Call",
            Self::Operation(name) => name,
            Self::Unknown => "Unknown Operation",
        }
    }
}

impl fmt::Display for SpanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds, in milliseconds, of the fast/normal/slow buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Below this is fast.
    pub fast: f64,
    /// Below this is normal.
    pub normal: f64,
    /// Below this is slow; anything else is critical.
    pub slow: f64,
}

impl Thresholds {
    /// HTTP and everything without a specific profile.
    pub const DEFAULT: Self = Self {
        fast: 100.0,
        normal: 500.0,
        slow: 2_000.0,
    };

    /// Database queries.
    pub const DATABASE: Self = Self {
        fast: 50.0,
        normal: 200.0,
        slow: 1_000.0,
    };

    /// RPC and gRPC calls.
    pub const RPC: Self = Self {
        fast: 50.0,
        normal: 300.0,
        slow: 1_000.0,
    };

    /// Picks the profile for a span type label.
    pub fn for_label(label: &str) -> Self {
        if label.contains("Database") {
            Self::DATABASE
        } else if label.contains("RPC") || label.contains("gRPC") {
            Self::RPC
        } else {
            Self::DEFAULT
        }
    }

    /// Buckets a duration. Every bound is exclusive.
    pub fn assess(&self, duration_ms: f64) -> Assessment {
        if duration_ms < self.fast {
            Assessment::Fast
        } else if duration_ms < self.normal {
            Assessment::Normal
        } else if duration_ms < self.slow {
            Assessment::Slow
        } else {
            Assessment::Critical
        }
    }
}

/// Explains a span.
///
/// The span is assumed to have passed caller validation; missing names are
/// replaced by placeholders rather than rejected.
pub fn analyze(span: &SpanRecord) -> ExplanationResult {
    let duration_ms = span.duration_ms();
    let span_type = SpanType::detect(span);
    let assessment = Thresholds::for_label(span_type.as_str()).assess(duration_ms);
    let error_info = error_info(span);
    let key_details = key_details(span);
    let summary = summary(span, &span_type, error_info.is_some());

    debug!(
        span_id = %span.span_id,
        span_type = %span_type,
        duration_ms,
        assessment = %assessment,
        has_error = error_info.is_some(),
        "Analyzed span"
    );

    ExplanationResult {
        summary,
        span_type: span_type.to_string(),
        performance: Performance {
            duration: format_duration_ms(duration_ms),
            assessment,
        },
        error_info,
        key_details,
    }
}

/// Extracts error details, or `None` when the span succeeded.
pub fn error_info(span: &SpanRecord) -> Option<ErrorInfo> {
    let error_flag = span.tag("error").is_some_and(TagValue::is_true);
    let status_code = span.tag("http.status_code");
    let server_failure = status_code
        .and_then(TagValue::as_integer)
        .is_some_and(|code| code >= 500);

    if !error_flag && !server_failure {
        return None;
    }

    let error_type = status_code.map_or_else(|| "Error".to_string(), |code| format!("HTTP {code}"));

    Some(ErrorInfo {
        has_error: true,
        error_type: Some(error_type),
        error_message: error_message(span),
    })
}

/// Message from the first log event carrying a `message` or `error` field.
fn error_message(span: &SpanRecord) -> Option<String> {
    let log = span
        .logs()
        .iter()
        .find(|log| log.has_field("error") || log.has_field("message"))?;
    let value = log.field("message").or_else(|| log.field("error"))?;
    let message = value.to_string();
    (!message.is_empty()).then_some(message)
}

/// Notable tags in their original order, then the service, capped at five.
pub fn key_details(span: &SpanRecord) -> Vec<String> {
    let mut details: Vec<String> = span
        .tags
        .iter()
        .filter_map(|tag| {
            let value = &tag.value;
            match tag.key.as_str() {
                key @ ("http.method" | "http.status_code") => Some(format!("{key}: {value}")),
                "db.type" => Some(format!("Database: {value}")),
                "db.statement" => {
                    let statement = value.to_string();
                    (statement.chars().count() < MAX_STATEMENT_CHARS)
                        .then(|| format!("Query: {statement}"))
                }
                "span.kind" => Some(format!("Span kind: {value}")),
                "component" => Some(format!("Component: {value}")),
                _ => None,
            }
        })
        .collect();

    if !span.service_name.is_empty() {
        details.push(format!("Service: {}", span.service_name));
    }

    details.truncate(MAX_KEY_DETAILS);
    details
}

fn summary(span: &SpanRecord, span_type: &SpanType, has_error: bool) -> String {
    let operation = non_empty_or(&span.operation_name, "operation");
    let service = non_empty_or(&span.service_name, "unknown service");
    let status = if has_error {
        "with errors"
    } else {
        "completed successfully"
    };
    format!("{span_type}: {operation} from {service}, {status}")
}

const fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// Formats milliseconds as `800.00μs`, `45.00ms` or `3.50s`.
pub fn format_duration_ms(duration_ms: f64) -> String {
    if duration_ms < 1.0 {
        format!("{:.2}μs", duration_ms * 1_000.0)
    } else if duration_ms < 1_000.0 {
        format!("{duration_ms:.2}ms")
    } else {
        format!("{:.2}s", duration_ms / 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_model::fixtures;
    use lens_model::{LogEvent, Tag};
    use proptest::prelude::*;

    fn span(duration: u64) -> SpanRecord {
        SpanRecord::new("span-1", "trace-1", "HTTP GET /api/users", "frontend")
            .with_duration(duration)
    }

    #[test]
    fn fast_http_client() {
        let span = span(45_000)
            .with_tag("http.method", "GET")
            .with_tag("http.status_code", 200i64)
            .with_tag("span.kind", "client");

        let result = analyze(&span);

        assert_eq!(result.span_type, "HTTP Client");
        assert_eq!(result.performance.duration, "45.00ms");
        assert_eq!(result.performance.assessment, Assessment::Fast);
        assert!(result.error_info.is_none());
        assert_eq!(
            result.key_details,
            vec![
                "http.method: GET",
                "http.status_code: 200",
                "Span kind: client",
                "Service: frontend",
            ]
        );
        insta::assert_snapshot!(
            result.summary,
            @"HTTP Client: HTTP GET /api/users from frontend, completed successfully"
        );
    }

    #[test]
    fn slow_database_query() {
        let span = SpanRecord::new(
            "db-1",
            "trace-1",
            "SELECT * FROM users WHERE id = ?",
            "user-service",
        )
        .with_duration(850_000)
        .with_tag("db.type", "postgres");

        let result = analyze(&span);

        assert_eq!(result.span_type, "Database Query");
        assert_eq!(result.performance.duration, "850.00ms");
        assert_eq!(result.performance.assessment, Assessment::Slow);
        assert!(result.error_info.is_none());
    }

    #[test]
    fn status_500_without_error_tag() {
        let span = span(10_000)
            .with_tag("http.method", "POST")
            .with_tag("http.status_code", 500i64);

        let info = analyze(&span).error_info.unwrap();

        assert!(info.has_error);
        assert_eq!(info.error_type.as_deref(), Some("HTTP 500"));
        assert_eq!(info.error_message, None);
    }

    #[test]
    fn string_status_codes_are_parsed() {
        let span = span(10_000).with_tag("http.status_code", "503");
        let info = error_info(&span).unwrap();
        assert_eq!(info.error_type.as_deref(), Some("HTTP 503"));

        let span = self::span(10_000).with_tag("http.status_code", "404");
        assert!(error_info(&span).is_none());
    }

    #[test]
    fn error_tag_without_status_code() {
        let span = span(10_000).with_tag("error", "true");
        let info = error_info(&span).unwrap();
        assert_eq!(info.error_type.as_deref(), Some("Error"));

        let span = self::span(10_000).with_tag("error", false);
        assert!(error_info(&span).is_none());
    }

    #[test]
    fn error_type_reports_status_even_below_500() {
        let span = span(10_000)
            .with_tag("error", true)
            .with_tag("http.status_code", 429i64);
        let info = error_info(&span).unwrap();
        assert_eq!(info.error_type.as_deref(), Some("HTTP 429"));
    }

    #[test]
    fn error_message_prefers_message_field() {
        let span = span(10_000)
            .with_tag("error", true)
            .with_log(LogEvent::new(1, vec![Tag::new("event", "retry")]))
            .with_log(LogEvent::new(
                2,
                vec![
                    Tag::new("error", "ECONNRESET"),
                    Tag::new("message", "Connection reset by peer"),
                ],
            ))
            .with_log(LogEvent::new(3, vec![Tag::new("message", "later message")]));

        let info = error_info(&span).unwrap();
        assert_eq!(info.error_message.as_deref(), Some("Connection reset by peer"));
    }

    #[test]
    fn error_message_falls_back_to_error_field() {
        let info = error_info(&fixtures::failed_query()).unwrap();
        assert_eq!(info.error_type.as_deref(), Some("Error"));
        assert_eq!(
            info.error_message.as_deref(),
            Some("duplicate key value violates unique constraint \"users_email_key\"")
        );
    }

    #[test]
    fn span_type_detection_order() {
        let http_server = span(1)
            .with_tag("db.type", "postgres")
            .with_tag("http.method", "GET")
            .with_tag("span.kind", "server");
        assert_eq!(SpanType::detect(&http_server), SpanType::HttpServer);

        let db = span(1).with_tag("db.statement", "SELECT 1").with_tag("rpc.service", "x");
        assert_eq!(SpanType::detect(&db), SpanType::DatabaseQuery);

        let grpc = SpanRecord::new("s", "t", "GRPC /inventory.Reserve", "svc");
        assert_eq!(SpanType::detect(&grpc), SpanType::GrpcCall);

        let other = SpanRecord::new("s", "t", "process-batch", "svc");
        assert_eq!(SpanType::detect(&other).as_str(), "process-batch");

        let unnamed = SpanRecord::new("s", "t", "", "svc");
        assert_eq!(SpanType::detect(&unnamed).as_str(), "Unknown Operation");
    }

    #[test]
    fn thresholds_are_exclusive() {
        let http = Thresholds::DEFAULT;
        assert_eq!(http.assess(99.9), Assessment::Fast);
        assert_eq!(http.assess(100.0), Assessment::Normal);
        assert_eq!(http.assess(500.0), Assessment::Slow);
        assert_eq!(http.assess(2_000.0), Assessment::Critical);

        let db = Thresholds::for_label("Database Query");
        assert_eq!(db.assess(50.0), Assessment::Normal);
        assert_eq!(db.assess(1_000.0), Assessment::Critical);

        let rpc = Thresholds::for_label("gRPC Call");
        assert_eq!(rpc, Thresholds::RPC);
        assert_eq!(rpc.assess(299.0), Assessment::Normal);
        assert_eq!(rpc.assess(300.0), Assessment::Slow);
    }

    #[test]
    fn grpc_fixture_uses_rpc_profile() {
        let result = analyze(&fixtures::grpc_call());
        assert_eq!(result.span_type, "gRPC Call");
        assert_eq!(result.performance.assessment, Assessment::Slow);
    }

    #[test]
    fn long_statements_are_omitted() {
        let long = "SELECT ".to_string() + &"x, ".repeat(40) + "y FROM t";
        let span = span(1)
            .with_tag("db.statement", long.as_str())
            .with_tag("db.statement", "SELECT 1");
        assert_eq!(key_details(&span), vec!["Query: SELECT 1", "Service: frontend"]);
    }

    #[test]
    fn service_note_counts_toward_limit() {
        let result = analyze(&fixtures::successful_get());
        assert_eq!(
            result.key_details,
            vec![
                "http.method: GET",
                "http.status_code: 200",
                "Span kind: client",
                "Component: fetch",
                "Service: frontend-service",
            ]
        );

        let crowded = span(1)
            .with_tag("db.type", "postgres")
            .with_tag("http.method", "GET")
            .with_tag("http.status_code", 200i64)
            .with_tag("span.kind", "client")
            .with_tag("component", "pg");
        let details = key_details(&crowded);
        assert_eq!(details.len(), 5);
        assert!(!details.iter().any(|d| d.starts_with("Service:")));
    }

    #[test]
    fn server_error_fixture() {
        let result = analyze(&fixtures::server_error());

        assert_eq!(result.span_type, "HTTP Server");
        assert_eq!(result.performance.assessment, Assessment::Fast);
        let info = result.error_info.unwrap();
        assert_eq!(info.error_type.as_deref(), Some("HTTP 500"));
        assert_eq!(info.error_message.as_deref(), Some("Database connection timeout"));
        insta::assert_snapshot!(
            result.summary,
            @"HTTP Server: HTTP POST /api/payment from payment-service, with errors"
        );
    }

    #[test]
    fn summary_placeholders() {
        let span = SpanRecord::new("s", "t", "", "").with_tag("http.method", "GET");
        assert_eq!(
            analyze(&span).summary,
            "HTTP Client: operation from unknown service, completed successfully"
        );
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration_ms(0.8), "800.00μs");
        assert_eq!(format_duration_ms(3.5), "3.50ms");
        assert_eq!(format_duration_ms(999.994), "999.99ms");
        assert_eq!(format_duration_ms(5_200.0), "5.20s");
    }

    fn tag_strategy() -> impl Strategy<Value = Tag> {
        let keys = prop::sample::select(vec![
            "http.method",
            "http.status_code",
            "db.type",
            "db.statement",
            "span.kind",
            "component",
            "error",
            "peer.service",
        ]);
        (keys, "[a-zA-Z0-9 ]{0,12}").prop_map(|(key, value)| Tag::new(key, value))
    }

    proptest! {
        #[test]
        fn key_details_never_exceed_limit(
            tags in prop::collection::vec(tag_strategy(), 0..20),
            service in "[a-z-]{0,12}",
        ) {
            let mut span = SpanRecord::new("s", "t", "op", service);
            span.tags = tags;
            prop_assert!(analyze(&span).key_details.len() <= MAX_KEY_DETAILS);
        }

        #[test]
        fn error_info_is_null_or_flagged(
            tags in prop::collection::vec(tag_strategy(), 0..10),
            duration in 0u64..10_000_000,
        ) {
            let mut span = SpanRecord::new("s", "t", "op", "svc").with_duration(duration);
            span.tags = tags;
            let result = analyze(&span);
            if let Some(info) = &result.error_info {
                prop_assert!(info.has_error);
                prop_assert!(result.summary.ends_with("with errors"));
            } else {
                prop_assert!(result.summary.ends_with("completed successfully"));
            }
        }
    }
}
