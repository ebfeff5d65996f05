//! Prompt building for query translation and span explanation.

use crate::error::Result;
use lens_model::{LogEvent, SpanRecord, Tag};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Marks the start of the span JSON in an explanation prompt.
pub const SPAN_DATA_MARKER: &str = "Span Data:";

const QUERY_LABEL: &str = "User Query:";
const OUTPUT_LABEL: &str = "JSON Output:";

const QUERY_SYSTEM_PROMPT: &str = r#"You translate natural-language questions about distributed traces into Jaeger search parameters.

Respond with a single JSON object and nothing else: no markdown, no commentary.

Rules:
1. "service" is required. Use "unknown-service" if no service is named.
2. Infer "operation" from verbs such as GET, POST or SELECT. Use null otherwise.
3. Derive tags from the wording, e.g. errors give {"error": "true"}.
4. "slow" or "long" means minDuration "500ms".
5. Lookback defaults to "1h" and limit defaults to 20.

Schema:
{
  "service": string,
  "operation": string | null,
  "tags": object,
  "minDuration": string | null,
  "maxDuration": string | null,
  "lookback": string,
  "limit": number
}

Durations use ms, s or m ("500ms", "2s", "5m"). Lookback uses h or d ("1h", "24h", "7d").

Examples:

Query: show me slow requests in payment service
{"service":"payment-service","operation":null,"tags":{},"minDuration":"500ms","maxDuration":null,"lookback":"1h","limit":20}

Query: errors in user-api from the last hour
{"service":"user-api","operation":null,"tags":{"error":"true"},"minDuration":null,"maxDuration":null,"lookback":"1h","limit":20}

Query: GET requests to frontend that failed
{"service":"frontend","operation":"HTTP GET","tags":{"error":"true"},"minDuration":null,"maxDuration":null,"lookback":"1h","limit":20}"#;

const EXPLAIN_SYSTEM_PROMPT: &str = r#"You write short technical explanations of Jaeger spans.

Respond with a single JSON object and nothing else. Describe only what the span data shows.

Schema:
{
  "summary": string,
  "spanType": string,
  "performance": {"duration": string, "assessment": "fast" | "normal" | "slow" | "critical"},
  "errorInfo": {"hasError": boolean, "errorType": string | null, "errorMessage": string | null} | null,
  "keyDetails": string[]
}

Latency thresholds (fast / normal / slow, anything above is critical):
- HTTP and other spans: 100ms / 500ms / 2s
- Database queries: 50ms / 200ms / 1s
- RPC and gRPC calls: 50ms / 300ms / 1s

Span types:
- http.method tag: "HTTP Client" or "HTTP Server" depending on span.kind
- db.type or db.statement tag: "Database Query"
- rpc.service tag, or "grpc" in the operation name: "gRPC Call"
- otherwise the operation name, or "Unknown Operation" if it is empty

At most 5 key details.

Example:

{"operationName":"HTTP GET /api/users","serviceName":"frontend","duration":45000,"tags":[{"key":"http.method","value":"GET"},{"key":"http.status_code","value":200},{"key":"span.kind","value":"client"}]}
{"summary":"HTTP Client: HTTP GET /api/users from frontend, completed successfully","spanType":"HTTP Client","performance":{"duration":"45.00ms","assessment":"fast"},"errorInfo":null,"keyDetails":["http.method: GET","http.status_code: 200","Span kind: client","Service: frontend"]}"#;

/// The subset of a span sent to the model.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptSpan<'a> {
    operation_name: &'a str,
    service_name: &'a str,
    duration: u64,
    tags: &'a [Tag],
    #[serde(skip_serializing_if = "Option::is_none")]
    logs: Option<&'a [LogEvent]>,
}

impl<'a> From<&'a SpanRecord> for PromptSpan<'a> {
    fn from(span: &'a SpanRecord) -> Self {
        Self {
            operation_name: &span.operation_name,
            service_name: &span.service_name,
            duration: span.duration,
            tags: &span.tags,
            logs: span.logs.as_deref(),
        }
    }
}

/// Builds the prompt for translating a query.
///
/// Line breaks in the query are collapsed so the query line can be read back
/// with [`user_query`].
pub fn query_translation(query: &str) -> String {
    let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{QUERY_SYSTEM_PROMPT}\n\n{QUERY_LABEL} \"{query}\"\n\n{OUTPUT_LABEL}")
}

/// Builds the prompt for explaining a span.
///
/// # Errors
///
/// Returns an error if the span cannot be serialized.
pub fn span_explanation(span: &SpanRecord) -> Result<String> {
    let data = serde_json::to_string_pretty(&PromptSpan::from(span))?;
    Ok(format!(
        "{EXPLAIN_SYSTEM_PROMPT}\n\n{SPAN_DATA_MARKER}\n{data}\n\n{OUTPUT_LABEL}"
    ))
}

/// Reads the user query back out of a translation prompt.
pub fn user_query(prompt: &str) -> Option<&str> {
    query_line()
        .captures(prompt)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn query_line() -> &'static Regex {
    static QUERY_LINE: OnceLock<Regex> = OnceLock::new();
    QUERY_LINE.get_or_init(|| {
        Regex::new(r#"(?m)^User Query: "(.*)"$"#).expect("built-in pattern is valid")
    })
}

/// Returns the text following the span data marker.
pub fn span_data(prompt: &str) -> Option<&str> {
    prompt
        .find(SPAN_DATA_MARKER)
        .map(|start| &prompt[start + SPAN_DATA_MARKER.len()..])
}
